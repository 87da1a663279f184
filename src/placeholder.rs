//! Inert-gas placeholder substitution.
//!
//! Input SMILES may carry a wildcard attachment point (`*`) that the
//! drawing application cannot name. Before drawing, every wildcard becomes
//! a bracketed inert-gas atom the molecule does not already contain; after
//! naming, every spelling of that gas in the name is replaced with the
//! configured placeholder token.

use std::cmp::Reverse;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PlaceholderError {
    #[error("Every inert gas already occurs in {0}; no free substitute for the wildcard")]
    NoFreeGas(String),
}

/// An inert gas symbol and the spellings it can take in a generated name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InertGas {
    pub symbol: &'static str,
    pub aliases: [&'static str; 4],
}

/// Preference order for substitution.
pub static INERT_GASES: [InertGas; 6] = [
    InertGas { symbol: "He", aliases: ["Helium", "helium", "Helio", "helio"] },
    InertGas { symbol: "Ne", aliases: ["Neon", "neon", "Neio", "neio"] },
    InertGas { symbol: "Ar", aliases: ["Argon", "argon", "Argio", "argio"] },
    InertGas { symbol: "Kr", aliases: ["Krypton", "krypton", "Kryptio", "kryptio"] },
    InertGas { symbol: "Xe", aliases: ["Xenon", "xenon", "Xenio", "xenio"] },
    InertGas { symbol: "Rn", aliases: ["Radon", "radon", "Radonio", "radonio"] },
];

/// First gas whose symbol does not appear anywhere in `smiles`, ignoring case.
pub fn select_gas(smiles: &str) -> Option<&'static InertGas> {
    let lower = smiles.to_lowercase();
    INERT_GASES
        .iter()
        .find(|gas| !lower.contains(&gas.symbol.to_lowercase()))
}

/// SMILES ready for drawing, and the gas used (if any) to undo it later.
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    pub smiles: String,
    pub gas: Option<&'static InertGas>,
}

/// Replace every `wildcard` with `[<gas>]`. Inputs without a wildcard pass through.
pub fn substitute(smiles: &str, wildcard: &str) -> Result<Substitution, PlaceholderError> {
    if wildcard.is_empty() || !smiles.contains(wildcard) {
        return Ok(Substitution {
            smiles: smiles.to_string(),
            gas: None,
        });
    }
    let gas = select_gas(smiles).ok_or_else(|| PlaceholderError::NoFreeGas(smiles.to_string()))?;
    Ok(Substitution {
        smiles: smiles.replace(wildcard, &format!("[{}]", gas.symbol)),
        gas: Some(gas),
    })
}

/// Replace every alias of `gas` in `name` with `placeholder`.
///
/// Longer aliases go first so "Radonio" is not split by "Radon".
pub fn restore(name: &str, gas: &InertGas, placeholder: &str) -> String {
    let mut aliases = gas.aliases;
    aliases.sort_by_key(|alias| Reverse(alias.len()));
    aliases
        .iter()
        .fold(name.to_string(), |acc, alias| acc.replace(alias, placeholder))
}
