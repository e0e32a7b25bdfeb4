use thiserror::Error;

/// Erros comuns da biblioteca Vigia
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Erro de comunicação com o node Ethereum (inclui reverts de `eth_call`)
    #[error("Erro de RPC: {0}")]
    RpcError(String),
    
    /// Erro de decodificação de dados
    #[error("Erro de decodificação: {0}")]
    DecodeError(String),
    
    /// Erro de codificação de dados
    #[error("Erro de codificação: {0}")]
    EncodeError(String),
    
    /// Erro de validação
    #[error("Erro de validação: {0}")]
    ValidationError(String),
    
    /// Erro de timeout
    #[error("Timeout: {0}")]
    TimeoutError(String),
    
    /// Recurso não encontrado
    #[error("Não encontrado: {0}")]
    NotFound(String),

    /// Rede sem configuração registrada
    #[error("A rede com ID {0} não é suportada")]
    UnsupportedNetwork(u64),

    /// Erro ao carregar configuração
    #[error("Erro de configuração: {0}")]
    ConfigError(String),
    
    /// Erro genérico
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

/// Tipo de resultado usado em toda a biblioteca
pub type Result<T> = std::result::Result<T, Error>;
