/*!
 * Vigia Utils
 *
 * Utilitários comuns usados em toda a workspace Vigia
 */

use ethereum_types::{Address, H256, U256};
use std::str::FromStr;
use tiny_keccak::{Hasher, Keccak};

use crate::types::BlockTag;

/// Converte uma string hexadecimal para Address
pub fn hex_to_address(hex: &str) -> Option<Address> {
    let hex_str = hex.strip_prefix("0x").unwrap_or(hex);
    Address::from_str(hex_str).ok()
}

/// Converte uma string hexadecimal para H256
pub fn hex_to_h256(hex: &str) -> Option<H256> {
    let hex_str = hex.strip_prefix("0x").unwrap_or(hex);
    H256::from_str(hex_str).ok()
}

/// Formata um Address para exibição (minúsculo, com prefixo)
pub fn format_address(address: &Address) -> String {
    format!("0x{:x}", address)
}

/// Formata um H256 para exibição
pub fn format_h256(hash: &H256) -> String {
    format!("0x{:x}", hash)
}

/// Verifica se um endereço é um contrato
pub async fn is_contract<P: crate::traits::RpcProvider + ?Sized>(
    provider: &P,
    address: &Address,
    block: BlockTag,
) -> bool {
    match provider.get_code(*address, block).await {
        Ok(code) => !code.is_empty(),
        Err(_) => false,
    }
}

/// Calcula o hash Keccak-256 de dados
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut result = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut result);
    result
}

/// Calcula o endereço de um contrato criado via CREATE2
pub fn calculate_create2_address(sender: &Address, salt: &H256, init_code_hash: &H256) -> Address {
    // 0xff ++ sender ++ salt ++ keccak(init_code), conforme EIP-1014
    let mut buffer = Vec::with_capacity(1 + 20 + 32 + 32);
    buffer.push(0xff);
    buffer.extend_from_slice(sender.as_bytes());
    buffer.extend_from_slice(salt.as_bytes());
    buffer.extend_from_slice(init_code_hash.as_bytes());

    let hash = keccak256(&buffer);

    // Os últimos 20 bytes do hash formam o endereço
    Address::from_slice(&hash[12..32])
}

/// Formata um valor com decimais para exibição.
///
/// Zeros à direita da parte fracionária são removidos, mas ao menos um dígito
/// fracionário é mantido (`2.0`, `0.01`).
pub fn format_units(amount: &U256, decimals: u8) -> String {
    if decimals == 0 {
        return format!("{}.0", amount);
    }

    let divisor = U256::from(10).pow(U256::from(decimals));
    let integer_part = amount / divisor;
    let fractional_part = amount % divisor;

    // parte fracionária com zeros à esquerda até `decimals` dígitos
    let mut fractional = format!("{:0>width$}", fractional_part.to_string(), width = decimals as usize);
    while fractional.len() > 1 && fractional.ends_with('0') {
        fractional.pop();
    }

    format!("{}.{}", integer_part, fractional)
}

/// Calcula `value * percentage / 100` sem overflow silencioso
pub fn percentage_of(value: &U256, percentage: u64) -> U256 {
    value.saturating_mul(U256::from(percentage)) / U256::from(100u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_units_keeps_one_fractional_digit() {
        let e14 = U256::from(100_000_000_000_000u64);
        assert_eq!(format_units(&e14, 16), "0.01");
        assert_eq!(format_units(&(e14 * 10u64), 16), "0.1");
        assert_eq!(format_units(&(e14 * 200u64), 16), "2.0");
        assert_eq!(format_units(&(e14 * 3000u64), 16), "30.0");
        assert_eq!(format_units(&U256::zero(), 18), "0.0");
        assert_eq!(format_units(&U256::from(15u64), 1), "1.5");
    }

    #[test]
    fn create2_matches_eip1014_example() {
        // exemplo 0 da EIP-1014
        let sender = Address::zero();
        let salt = H256::zero();
        let init_code_hash = H256::from(keccak256(&[0x00]));
        let expected = hex_to_address("0x4D1A2e2bB4F88F0250f26Ffff098B0b30B26BF38").unwrap();
        assert_eq!(calculate_create2_address(&sender, &salt, &init_code_hash), expected);
    }

    #[test]
    fn hex_helpers_accept_prefix() {
        let a = hex_to_address("0x00000000000000000000000000000000000000aa").unwrap();
        assert_eq!(a, hex_to_address("00000000000000000000000000000000000000aa").unwrap());
        assert_eq!(format_address(&a), "0x00000000000000000000000000000000000000aa");
    }
}
