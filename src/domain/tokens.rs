//! Supported swap tokens and the placeholder price table.

/// Lamports per SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Asset label of native SOL on transfer operations
pub const NATIVE_ASSET: &str = "SOL";

/// Swap fee as a fraction of the input amount
pub const FEE_RATE: f64 = 0.003;

/// Slippage tolerance applied when the caller gives none
pub const DEFAULT_SLIPPAGE_TOLERANCE: f64 = 0.02;

/// Input size at which price impact reaches 100%
pub const PRICE_IMPACT_DEPTH: f64 = 100_000.0;

/// Seconds a private swap is expected to take
pub const ESTIMATED_SWAP_SECS: u64 = 3;

/// Token listed for swapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenInfo {
    pub symbol: &'static str,
    /// Mainnet mint address
    pub mint: &'static str,
    /// Reference rate used to derive exchange rates
    pub rate: f64,
}

const TOKENS: &[TokenInfo] = &[
    TokenInfo {
        symbol: "SOL",
        mint: "So11111111111111111111111111111111111111112",
        rate: 100.0,
    },
    TokenInfo {
        symbol: "USDC",
        mint: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
        rate: 1.0,
    },
    TokenInfo {
        symbol: "USDT",
        mint: "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB",
        rate: 1.0,
    },
    TokenInfo {
        symbol: "RAY",
        mint: "4k3Dyjzvzp8eMZWUXbBCjEvwSkkk59S5iCNLY3QrkX6R",
        rate: 2.5,
    },
    TokenInfo {
        symbol: "SRM",
        mint: "SRMuApVNdxXokk5GT7XD5cUUgXMBCoAz2LHeuAoKWRt",
        rate: 0.8,
    },
    TokenInfo {
        symbol: "ORCA",
        mint: "orcaEKTdK7LKz57vaAYr9QeNsVEPfiu6QeMU1kektZE",
        rate: 3.2,
    },
];

/// Look up a token by symbol (case-sensitive)
pub fn token(symbol: &str) -> Option<&'static TokenInfo> {
    TOKENS.iter().find(|t| t.symbol == symbol)
}

/// Symbols in listing order
pub fn supported_symbols() -> Vec<&'static str> {
    TOKENS.iter().map(|t| t.symbol).collect()
}

/// How the ledger names a token's balance: "SOL" for native, the mint otherwise
pub fn ledger_asset(token: &TokenInfo) -> &'static str {
    if token.symbol == NATIVE_ASSET {
        NATIVE_ASSET
    } else {
        token.mint
    }
}

/// Units of `to` received per unit of `from`
pub fn exchange_rate(from: &TokenInfo, to: &TokenInfo) -> f64 {
    to.rate / from.rate
}

/// Lamports to SOL
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// SOL to lamports, rounded to the nearest lamport
pub fn sol_to_lamports(sol: f64) -> u64 {
    (sol * LAMPORTS_PER_SOL as f64).round() as u64
}

/// Percent of the pool moved by an input of this size
pub fn price_impact(amount: f64) -> f64 {
    (amount / PRICE_IMPACT_DEPTH) * 100.0
}
