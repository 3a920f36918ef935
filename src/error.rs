use thiserror::Error;

/// Errors surfaced to callers of the build and query entry points
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The store could not be built; nothing was left on disk
    #[error("데이터셋 초기화 실패: 데이터셋을 초기화할 수 없습니다 ({source})")]
    Init {
        #[source]
        source: anyhow::Error,
    },

    #[error("evolution cycle detected at species {species_id} in chain {chain_id}")]
    EvolutionCycle { species_id: i64, chain_id: i64 },

    #[error("store query failed: {0}")]
    Store(#[from] rusqlite::Error),
}

impl DatasetError {
    pub fn init(source: anyhow::Error) -> Self {
        DatasetError::Init { source }
    }
}
