/*!
 * Vigia Events
 *
 * Eventos entregues aos bots pelo runtime e decodificação de logs
 */

use ethers::abi::{AbiParser, Event, RawLog, Token};
use ethers::types::Log;
use ethereum_types::{Address, H256, U256};

use crate::error::{Error, Result};
use crate::types::TransactionHash;

/// Faz o parse de uma assinatura legível de evento (`event Nome(...)`)
pub fn parse_event(signature: &str) -> Result<Event> {
    AbiParser::default()
        .parse_event(signature)
        .map_err(|e| Error::EncodeError(format!("assinatura de evento inválida `{}`: {}", signature, e)))
}

/// Log decodificado a partir de um ABI conhecido
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedLog {
    pub address: Address,
    pub name: String,
    pub params: Vec<(String, Token)>,
    pub transaction_hash: Option<TransactionHash>,
    pub block_number: Option<u64>,
}

impl DecodedLog {
    /// Valor de um parâmetro pelo nome
    pub fn param(&self, name: &str) -> Option<&Token> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    pub fn address_param(&self, name: &str) -> Result<Address> {
        self.param(name)
            .cloned()
            .and_then(Token::into_address)
            .ok_or_else(|| Error::DecodeError(format!("parâmetro `{}` ausente ou não é address em {}", name, self.name)))
    }

    pub fn uint_param(&self, name: &str) -> Result<U256> {
        self.param(name)
            .cloned()
            .and_then(Token::into_uint)
            .ok_or_else(|| Error::DecodeError(format!("parâmetro `{}` ausente ou não é uint em {}", name, self.name)))
    }
}

/// Decodifica um log bruto com o evento informado.
///
/// Retorna `None` quando o topic0 não corresponde ao evento ou quando os dados
/// não decodificam.
pub fn decode_log(event: &Event, log: &Log) -> Option<DecodedLog> {
    let topic0 = log.topics.first()?;
    if !event.anonymous && *topic0 != event.signature() {
        return None;
    }
    let raw = RawLog {
        topics: log.topics.clone(),
        data: log.data.to_vec(),
    };
    let decoded = event.parse_log(raw).ok()?;
    Some(DecodedLog {
        address: log.address,
        name: event.name.clone(),
        params: decoded.params.into_iter().map(|p| (p.name, p.value)).collect(),
        transaction_hash: log.transaction_hash,
        block_number: log.block_number.map(|n| n.as_u64()),
    })
}

/// Transação observada, com os logs emitidos
#[derive(Debug, Clone, Default)]
pub struct TransactionEvent {
    pub hash: TransactionHash,
    pub block_number: u64,
    pub from: Address,
    pub to: Option<Address>,
    pub logs: Vec<Log>,
}

impl TransactionEvent {
    pub fn new(hash: TransactionHash, block_number: u64) -> Self {
        Self {
            hash,
            block_number,
            ..Default::default()
        }
    }

    pub fn with_log(mut self, log: Log) -> Self {
        self.logs.push(log);
        self
    }

    /// Decodifica os logs que casam com `event`, opcionalmente restritos
    /// a um conjunto de emissores. A ordem dos logs é preservada.
    pub fn filter_log(&self, event: &Event, emitters: Option<&[Address]>) -> Vec<DecodedLog> {
        self.logs
            .iter()
            .filter(|log| emitters.map_or(true, |set| set.contains(&log.address)))
            .filter_map(|log| decode_log(event, log))
            .collect()
    }

    /// Como [`filter_log`](Self::filter_log), para vários eventos de uma vez.
    pub fn filter_logs(&self, events: &[Event], emitters: Option<&[Address]>) -> Vec<DecodedLog> {
        self.logs
            .iter()
            .filter(|log| emitters.map_or(true, |set| set.contains(&log.address)))
            .filter_map(|log| events.iter().find_map(|event| decode_log(event, log)))
            .collect()
    }
}

/// Bloco observado
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockEvent {
    pub number: u64,
    pub hash: Option<H256>,
    pub timestamp: u64,
}

impl BlockEvent {
    pub fn new(number: u64) -> Self {
        Self {
            number,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::abi::{encode, Token};
    use ethers::types::Bytes;

    fn transfer_log(emitter: Address, from: Address, to: Address, value: u64) -> Log {
        let event = parse_event("event Transfer(address indexed from, address indexed to, uint256 value)").unwrap();
        Log {
            address: emitter,
            topics: vec![event.signature(), H256::from(from), H256::from(to)],
            data: Bytes::from(encode(&[Token::Uint(value.into())])),
            ..Default::default()
        }
    }

    #[test]
    fn filter_log_respects_emitters_and_order() {
        let event = parse_event("event Transfer(address indexed from, address indexed to, uint256 value)").unwrap();
        let a = Address::repeat_byte(0x0a);
        let b = Address::repeat_byte(0x0b);
        let tx = TransactionEvent::new(H256::zero(), 7)
            .with_log(transfer_log(a, Address::repeat_byte(1), Address::repeat_byte(2), 10))
            .with_log(transfer_log(b, Address::repeat_byte(3), Address::repeat_byte(4), 20))
            .with_log(transfer_log(a, Address::repeat_byte(5), Address::repeat_byte(6), 30));

        let all = tx.filter_log(&event, None);
        assert_eq!(all.len(), 3);

        let only_a = tx.filter_log(&event, Some(&[a]));
        assert_eq!(only_a.len(), 2);
        assert_eq!(only_a[0].uint_param("value").unwrap(), U256::from(10u64));
        assert_eq!(only_a[1].uint_param("value").unwrap(), U256::from(30u64));
        assert_eq!(only_a[1].address_param("from").unwrap(), Address::repeat_byte(5));
    }

    #[test]
    fn other_events_are_ignored() {
        let approval = parse_event("event Approval(address indexed owner, address indexed spender, uint256 value)").unwrap();
        let tx = TransactionEvent::new(H256::zero(), 1)
            .with_log(transfer_log(Address::zero(), Address::zero(), Address::zero(), 1));
        assert!(tx.filter_log(&approval, None).is_empty());
    }

    #[test]
    fn invalid_signature_is_an_error() {
        assert!(matches!(parse_event("Transfer(address"), Err(Error::EncodeError(_))));
    }
}
