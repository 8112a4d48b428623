/// NIST elliptic curve groups.
pub mod ec;
/// Quadratic residues modulo a product of safe primes.
pub mod qr;
/// Prime-order subgroups of `Z_P^*`.
pub mod schnorr;

use core::fmt;
use core::str::FromStr;

use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};

pub use ec::{EcGroup, P224, P256, P384, P521};
pub use qr::QrSpecialRsa;
pub use schnorr::SchnorrGroup;

use crate::{Error, Group, Result};

/// Names a group family and its size.
///
/// Parsed from `p224`, `p256`, `p384`, `p521`, `rfc5114`, `schnorr:<bits>`
/// and `qr:<bits>`. Generated families draw fresh parameters on every
/// [`GroupSelector::dispatch`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GroupSelector {
    /// Freshly generated Schnorr group with a `bits`-bit order.
    Schnorr { bits: u64 },
    /// The fixed RFC 5114 2048-bit group.
    Rfc5114,
    /// NIST P-224.
    P224,
    /// NIST P-256.
    #[default]
    P256,
    /// NIST P-384.
    P384,
    /// NIST P-521.
    P521,
    /// Freshly generated `QR_N` from two `bits`-bit safe primes.
    QrSpecialRsa { bits: u64 },
}

/// Generic code run against whichever group a [`GroupSelector`] names.
pub trait GroupVisitor {
    type Output;

    fn visit<G: Group, R: CryptoRngCore>(self, group: G, rng: &mut R) -> Self::Output;
}

impl GroupSelector {
    /// Builds the selected group and hands it to `visitor`.
    pub fn dispatch<V, R>(&self, rng: &mut R, visitor: V) -> Result<V::Output>
    where
        V: GroupVisitor,
        R: CryptoRngCore,
    {
        let output = match *self {
            GroupSelector::Schnorr { bits } => {
                let group = SchnorrGroup::generate(bits, rng)?;
                visitor.visit(group, rng)
            }
            GroupSelector::Rfc5114 => visitor.visit(SchnorrGroup::rfc5114_2048_256(), rng),
            GroupSelector::P224 => visitor.visit(P224::p224(), rng),
            GroupSelector::P256 => visitor.visit(P256::p256(), rng),
            GroupSelector::P384 => visitor.visit(P384::p384(), rng),
            GroupSelector::P521 => visitor.visit(P521::p521(), rng),
            GroupSelector::QrSpecialRsa { bits } => {
                let group = QrSpecialRsa::generate(bits, rng)?;
                visitor.visit(group, rng)
            }
        };
        Ok(output)
    }
}

impl FromStr for GroupSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let parse_bits = |bits: &str| {
            bits.parse::<u64>()
                .map_err(|_| Error::InvalidParams(format!("invalid bit size in '{s}'")))
        };

        match lower.split_once(':') {
            Some(("schnorr", bits)) => Ok(GroupSelector::Schnorr {
                bits: parse_bits(bits)?,
            }),
            Some(("qr", bits)) => Ok(GroupSelector::QrSpecialRsa {
                bits: parse_bits(bits)?,
            }),
            Some(_) => Err(Error::InvalidParams(format!("unknown group '{s}'"))),
            None => match lower.as_str() {
                "rfc5114" => Ok(GroupSelector::Rfc5114),
                "p224" | "p-224" => Ok(GroupSelector::P224),
                "p256" | "p-256" => Ok(GroupSelector::P256),
                "p384" | "p-384" => Ok(GroupSelector::P384),
                "p521" | "p-521" => Ok(GroupSelector::P521),
                _ => Err(Error::InvalidParams(format!("unknown group '{s}'"))),
            },
        }
    }
}

impl TryFrom<String> for GroupSelector {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<GroupSelector> for String {
    fn from(value: GroupSelector) -> Self {
        value.to_string()
    }
}

impl fmt::Display for GroupSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupSelector::Schnorr { bits } => write!(f, "schnorr:{bits}"),
            GroupSelector::Rfc5114 => f.write_str("rfc5114"),
            GroupSelector::P224 => f.write_str("p224"),
            GroupSelector::P256 => f.write_str("p256"),
            GroupSelector::P384 => f.write_str("p384"),
            GroupSelector::P521 => f.write_str("p521"),
            GroupSelector::QrSpecialRsa { bits } => write!(f, "qr:{bits}"),
        }
    }
}
