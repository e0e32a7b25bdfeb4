use ethereum_types::{Address, H256, U256};
use ethers::abi::Token;
use std::fmt;
use vigia_core::types::BlockTag;

const DELIMITER: char = '|';

/// Caracteres com significado estrutural na chave; nunca aparecem crus
/// dentro de um texto livre.
const RESERVED: [char; 8] = ['%', '|', ',', '[', ']', '(', ')', '@'];

/// Representação canônica de um componente de chave.
///
/// Implementações devem produzir o mesmo texto para valores iguais após
/// normalização (endereços em minúsculo, números em decimal) e nunca
/// produzir o delimitador `|`.
pub trait KeyPart {
    fn write_key(&self, out: &mut String);
}

fn escape_into(value: &str, out: &mut String) {
    for c in value.chars() {
        if RESERVED.contains(&c) {
            out.push_str(&format!("%{:02X}", c as u32));
        } else {
            out.push(c);
        }
    }
}

impl KeyPart for Address {
    fn write_key(&self, out: &mut String) {
        out.push_str(&format!("0x{:x}", self));
    }
}

impl KeyPart for H256 {
    fn write_key(&self, out: &mut String) {
        out.push_str(&format!("0x{:x}", self));
    }
}

impl KeyPart for U256 {
    fn write_key(&self, out: &mut String) {
        out.push_str(&self.to_string());
    }
}

impl KeyPart for u64 {
    fn write_key(&self, out: &mut String) {
        out.push_str(&self.to_string());
    }
}

impl KeyPart for u32 {
    fn write_key(&self, out: &mut String) {
        out.push_str(&self.to_string());
    }
}

impl KeyPart for bool {
    fn write_key(&self, out: &mut String) {
        out.push_str(if *self { "true" } else { "false" });
    }
}

impl KeyPart for BlockTag {
    fn write_key(&self, out: &mut String) {
        // "0x1a" e "26" viram Number(26); `earliest` é o bloco 0
        match self.as_number() {
            Some(n) => n.write_key(out),
            None => out.push_str(&self.to_string()),
        }
    }
}

impl KeyPart for str {
    fn write_key(&self, out: &mut String) {
        escape_into(self, out);
    }
}

impl KeyPart for String {
    fn write_key(&self, out: &mut String) {
        escape_into(self, out);
    }
}

impl KeyPart for Token {
    fn write_key(&self, out: &mut String) {
        match self {
            Token::Address(a) => {
                out.push_str("addr:");
                a.write_key(out);
            }
            Token::Uint(v) => {
                out.push_str("uint:");
                v.write_key(out);
            }
            Token::Int(v) => {
                // complemento de dois, igual ao encoding ABI
                out.push_str("int:");
                v.write_key(out);
            }
            Token::Bool(b) => {
                out.push_str("bool:");
                b.write_key(out);
            }
            Token::String(s) => {
                out.push_str("str:");
                escape_into(s, out);
            }
            Token::Bytes(bytes) => {
                out.push_str("bytes:0x");
                out.push_str(&to_hex(bytes));
            }
            Token::FixedBytes(bytes) => {
                out.push_str("fixed:0x");
                out.push_str(&to_hex(bytes));
            }
            Token::Array(items) | Token::FixedArray(items) => write_sequence(items, '[', ']', out),
            Token::Tuple(items) => write_sequence(items, '(', ')', out),
        }
    }
}

impl<T: KeyPart + ?Sized> KeyPart for &T {
    fn write_key(&self, out: &mut String) {
        (**self).write_key(out);
    }
}

fn write_sequence(items: &[Token], open: char, close: char, out: &mut String) {
    out.push(open);
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        item.write_key(out);
    }
    out.push(close);
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Chave composta (contrato, bloco, método, argumentos)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Inicia uma chave para uma leitura em `contract` no bloco `block`
    pub fn builder(contract: Address, block: BlockTag) -> CacheKeyBuilder {
        let mut buf = String::with_capacity(96);
        contract.write_key(&mut buf);
        buf.push(DELIMITER);
        block.write_key(&mut buf);
        CacheKeyBuilder { buf }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Construtor incremental de [`CacheKey`]
#[derive(Debug, Clone)]
pub struct CacheKeyBuilder {
    buf: String,
}

impl CacheKeyBuilder {
    /// Nome do método lido; distingue leituras diferentes do mesmo contrato
    pub fn method(mut self, name: &str) -> Self {
        self.buf.push(DELIMITER);
        self.buf.push('@');
        escape_into(name, &mut self.buf);
        self
    }

    pub fn arg<T: KeyPart + ?Sized>(mut self, part: &T) -> Self {
        self.buf.push(DELIMITER);
        part.write_key(&mut self.buf);
        self
    }

    pub fn tokens(self, tokens: &[Token]) -> Self {
        tokens.iter().fold(self, |builder, token| builder.arg(token))
    }

    pub fn build(self) -> CacheKey {
        CacheKey(self.buf)
    }
}
