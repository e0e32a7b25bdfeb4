/*!
 * Vigia Types
 *
 * Tipos comuns usados em toda a workspace Vigia
 */

use ethereum_types::{Address, H256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Alias para hash de transação
pub type TransactionHash = H256;

/// Referência a um ponto do histórico da chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BlockTag {
    Earliest,
    Number(u64),
    Latest,
    Pending,
}

impl BlockTag {
    /// Indica se a tag aponta para um estado imutável da chain.
    ///
    /// Apenas leituras históricas podem ser memorizadas; `latest` e `pending`
    /// mudam a cada bloco.
    pub fn is_historical(&self) -> bool {
        matches!(self, BlockTag::Earliest | BlockTag::Number(_))
    }

    /// Número do bloco, quando a tag é numérica
    pub fn as_number(&self) -> Option<u64> {
        match self {
            BlockTag::Number(n) => Some(*n),
            BlockTag::Earliest => Some(0),
            _ => None,
        }
    }
}

impl From<u64> for BlockTag {
    fn from(value: u64) -> Self {
        BlockTag::Number(value)
    }
}

impl FromStr for BlockTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "latest" => return Ok(BlockTag::Latest),
            "pending" => return Ok(BlockTag::Pending),
            "earliest" => return Ok(BlockTag::Earliest),
            _ => {}
        }
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => s.parse::<u64>(),
        };
        parsed
            .map(BlockTag::Number)
            .map_err(|_| Error::ValidationError(format!("tag de bloco inválida: {s}")))
    }
}

impl TryFrom<String> for BlockTag {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BlockTag> for String {
    fn from(value: BlockTag) -> Self {
        value.to_string()
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockTag::Earliest => write!(f, "earliest"),
            BlockTag::Number(n) => write!(f, "{}", n),
            BlockTag::Latest => write!(f, "latest"),
            BlockTag::Pending => write!(f, "pending"),
        }
    }
}

/// Severidade de um finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum FindingSeverity {
    #[default]
    Unknown,
    Info,
    Low,
    Medium,
    High,
    Critical,
}

/// Natureza de um finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FindingType {
    #[default]
    Unknown,
    Info,
    Suspicious,
    Exploit,
}

/// Alerta estruturado emitido por um bot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub name: String,
    pub description: String,
    pub alert_id: String,
    pub severity: FindingSeverity,
    #[serde(rename = "type")]
    pub finding_type: FindingType,
    pub protocol: String,
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub addresses: Vec<Address>,
}

impl Finding {
    /// Cria um finding sem metadata
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        alert_id: impl Into<String>,
        severity: FindingSeverity,
        finding_type: FindingType,
        protocol: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            alert_id: alert_id.into(),
            severity,
            finding_type,
            protocol: protocol.into(),
            metadata: BTreeMap::new(),
            addresses: Vec::new(),
        }
    }

    /// Adiciona uma entrada de metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Adiciona um endereço envolvido
    pub fn with_address(mut self, address: Address) -> Self {
        if !self.addresses.contains(&address) {
            self.addresses.push(address);
        }
        self
    }
}

/// Filtro para `eth_getLogs`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub from_block: u64,
    pub to_block: u64,
    pub addresses: Vec<Address>,
    pub topic0: Vec<H256>,
}

impl LogFilter {
    /// Filtro para um único bloco
    pub fn block(number: u64) -> Self {
        Self {
            from_block: number,
            to_block: number,
            ..Default::default()
        }
    }

    pub fn address(mut self, address: Address) -> Self {
        self.addresses.push(address);
        self
    }

    pub fn topic0(mut self, topic: H256) -> Self {
        self.topic0.push(topic);
        self
    }
}
