use crate::schema::TableSchema;

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE {} (\n", schema.name);
    let single_pk = match schema.primary_key {
        [column] => Some(*column),
        _ => None,
    };
    let mut columns = Vec::new();

    for col in schema.columns {
        let null_constraint = if !col.nullable { " NOT NULL" } else { "" };
        let pk = if single_pk == Some(col.name) { " PRIMARY KEY" } else { "" };

        columns.push(format!(
            "    {} {}{}{}",
            col.name,
            col.col_type.sql_type(),
            pk,
            null_constraint
        ));
    }

    if schema.primary_key.len() > 1 {
        columns.push(format!("    PRIMARY KEY ({})", schema.primary_key.join(", ")));
    }

    for fk in schema.foreign_keys {
        columns.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {}({})",
            fk.column, fk.references_table, fk.references_column
        ));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements for foreign key columns and declared indexes
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut statements = Vec::new();

    let fk_indexes = schema.foreign_keys.iter().map(|fk| vec![fk.column]);
    let declared = schema.indexes.iter().map(|i| i.columns.to_vec());

    for columns in fk_indexes.chain(declared) {
        let suffix = columns.join("_");
        if seen.contains(&suffix) {
            continue;
        }
        statements.push(format!(
            "CREATE INDEX idx_{}_{} ON {}({})",
            schema.name,
            suffix,
            schema.name,
            columns.join(", ")
        ));
        seen.push(suffix);
    }

    statements
}
