//! HoleSwap: quoted, MEV-protected token swaps.

use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domain::tokens::{
    self, DEFAULT_SLIPPAGE_TOLERANCE, ESTIMATED_SWAP_SECS, FEE_RATE, NATIVE_ASSET, TokenInfo,
};
use crate::domain::{
    Operation, OperationKind, PoolInfo, ProofArtifact, ProofContext, ProofPurpose, SdkError,
    SwapParams, SwapQuote, SwapResult, SwapState, SwapStatus, ValidationError, validation,
};

use super::pipeline::{Authority, OperationExecutor, OperationSpec, Run, Spend, expect_proofs};

/// Reference liquidity of the quoted side of every pool
const POOL_LIQUIDITY: f64 = 1_000_000.0;
const POOL_VOLUME_24H: f64 = 5_000_000.0;
const POOL_APY: f64 = 12.5;

/// Price a swap between two listed tokens
#[must_use]
pub fn quote(
    from: &TokenInfo,
    to: &TokenInfo,
    amount: f64,
    slippage_tolerance: Option<f64>,
) -> SwapQuote {
    let exchange_rate = tokens::exchange_rate(from, to);
    let output_amount = amount * exchange_rate;
    let slippage = slippage_tolerance.unwrap_or(DEFAULT_SLIPPAGE_TOLERANCE);

    SwapQuote {
        from_token: from.symbol.to_string(),
        to_token: to.symbol.to_string(),
        input_amount: amount,
        output_amount,
        exchange_rate,
        minimum_received: output_amount * (1.0 - slippage),
        price_impact: tokens::price_impact(amount),
        fee: amount * FEE_RATE,
        route: vec![from.symbol.to_string(), to.symbol.to_string()],
        estimated_time: ESTIMATED_SWAP_SECS,
    }
}

/// Swap resolved against the token table
#[derive(Debug, Clone)]
pub struct SwapPlan {
    pub from: &'static TokenInfo,
    pub to: &'static TokenInfo,
    pub quote: SwapQuote,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SwapOperation;

impl OperationSpec for SwapOperation {
    type Params = SwapParams;
    type Prepared = SwapPlan;
    type Output = SwapResult;

    fn kind(&self) -> OperationKind {
        OperationKind::Swap
    }

    fn authority(&self) -> Authority {
        Authority::Signer
    }

    fn validate(&self, params: &SwapParams) -> Result<(), ValidationError> {
        validation::validate_swap(params).map(|_| ())
    }

    fn prepare(&self, params: &SwapParams) -> Result<SwapPlan, SdkError> {
        let (from, to) = validation::validate_swap(params)?;
        Ok(SwapPlan {
            from,
            to,
            quote: quote(from, to, params.amount, params.slippage_tolerance),
        })
    }

    fn spend(&self, plan: &SwapPlan) -> Option<Spend> {
        let amount = plan.quote.input_amount;
        if plan.from.symbol == NATIVE_ASSET {
            return Some(Spend::Native { amount });
        }
        Some(Spend::Token {
            symbol: plan.from.symbol,
            mint: plan.from.mint,
            amount,
        })
    }

    fn proof_requests(&self, run: &Run, plan: &SwapPlan) -> Vec<ProofContext> {
        vec![
            ProofContext::new(ProofPurpose::SwapProtection, &run.id, &run.owner)
                .with_input("fromToken", plan.from.symbol)
                .with_input("amount", plan.quote.input_amount),
            ProofContext::new(ProofPurpose::SwapRouting, &run.id, &run.owner)
                .with_input("route", plan.quote.route.join(">")),
        ]
    }

    fn operation(&self, run: &Run, plan: &SwapPlan) -> Operation {
        let mut operation = Operation::new(&run.id, OperationKind::Swap, &run.owner);
        operation.asset = Some(tokens::ledger_asset(plan.from).to_string());
        operation.amount = Some(plan.quote.input_amount);
        operation.output_asset = Some(tokens::ledger_asset(plan.to).to_string());
        operation.output_amount = Some(plan.quote.output_amount);
        operation
    }

    fn build(
        &self,
        run: &Run,
        plan: SwapPlan,
        proofs: Vec<ProofArtifact>,
    ) -> Result<SwapResult, SdkError> {
        let [zk_proof, routing_proof] = expect_proofs::<2>(proofs)?;
        let quote = plan.quote;
        Ok(SwapResult {
            swap_id: run.id.clone(),
            signature: String::new(),
            from_token: quote.from_token,
            to_token: quote.to_token,
            input_amount: quote.input_amount,
            output_amount: quote.output_amount,
            exchange_rate: quote.exchange_rate,
            zk_proof,
            routing_proof,
            status: SwapState::Completed,
            timestamp: run.timestamp,
        })
    }

    fn attach_signature(&self, output: &mut SwapResult, signature: &str) {
        output.signature = signature.to_string();
    }
}

/// Client for HoleSwap
pub struct HoleSwapClient {
    executor: Arc<OperationExecutor>,
}

impl HoleSwapClient {
    #[must_use]
    pub fn new(executor: Arc<OperationExecutor>) -> Self {
        Self { executor }
    }

    /// Price a swap without executing it
    #[instrument(skip(self, params), fields(from = %params.from_token, to = %params.to_token))]
    pub fn get_quote(&self, params: &SwapParams) -> Result<SwapQuote, SdkError> {
        let (from, to) = validation::validate_swap(params)?;
        let quote = quote(from, to, params.amount, params.slippage_tolerance);
        debug!(rate = quote.exchange_rate, output = quote.output_amount, "Quote computed");
        Ok(quote)
    }

    #[instrument(skip(self, params), fields(from = %params.from_token, to = %params.to_token))]
    pub async fn execute_swap(&self, params: &SwapParams) -> Result<SwapResult, SdkError> {
        self.executor.execute(&SwapOperation, params).await
    }

    #[instrument(skip(self))]
    pub async fn get_swap_status(&self, swap_id: &str) -> Result<SwapStatus, SdkError> {
        validation::validate_identifier("swapId", swap_id)?;
        let status = self
            .executor
            .status_of(OperationKind::Swap, swap_id, "Failed to get swap status")
            .await?;

        Ok(SwapStatus {
            swap_id: status.id,
            status: SwapState::from_record(status.state),
            timestamp: status.updated_at,
            confirmations: Some(status.confirmations),
            error: status.error,
        })
    }

    pub fn get_pool_info(&self, token_a: &str, token_b: &str) -> Result<PoolInfo, SdkError> {
        let (a, b) = validation::validate_pool_pair(token_a, token_b)?;
        Ok(PoolInfo {
            token_a: a.symbol.to_string(),
            token_b: b.symbol.to_string(),
            liquidity_a: POOL_LIQUIDITY,
            liquidity_b: POOL_LIQUIDITY * tokens::exchange_rate(a, b),
            fee: FEE_RATE,
            volume_24h: POOL_VOLUME_24H,
            apy: POOL_APY,
        })
    }

    pub fn supported_tokens(&self) -> Vec<&'static str> {
        tokens::supported_symbols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::RandomIdGenerator;
    use crate::test_utils::{MockLedger, MockProver, MockWallet};

    const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

    fn client(ledger: Arc<MockLedger>) -> HoleSwapClient {
        let executor = OperationExecutor::new(
            Arc::new(MockProver::new()),
            ledger,
            Arc::new(MockWallet::signer()),
            Arc::new(RandomIdGenerator::new()),
        );
        HoleSwapClient::new(Arc::new(executor))
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_quote_uses_custom_slippage() {
        let client = client(Arc::new(MockLedger::new()));
        let mut params = SwapParams::new("USDC", "RAY", 100.0);
        params.slippage_tolerance = Some(0.1);

        let quote = client.get_quote(&params).unwrap();
        assert!(approx(quote.exchange_rate, 2.5));
        assert!(approx(quote.output_amount, 250.0));
        assert!(approx(quote.minimum_received, 225.0));
        assert!(approx(quote.price_impact, 0.1));
        assert_eq!(quote.route, vec!["USDC", "RAY"]);
    }

    #[test]
    fn test_quote_rejects_same_and_unknown_tokens() {
        let client = client(Arc::new(MockLedger::new()));
        assert!(client.get_quote(&SwapParams::new("SOL", "SOL", 1.0)).is_err());
        assert!(client.get_quote(&SwapParams::new("DOGE", "SOL", 1.0)).is_err());
        assert!(client.get_quote(&SwapParams::new("SOL", "USDC", 0.0)).is_err());
    }

    #[tokio::test]
    async fn test_execute_swap_completes() {
        let ledger = Arc::new(MockLedger::new().with_token_balance(USDC_MINT, 500.0));
        let client = client(ledger.clone());

        let result = client
            .execute_swap(&SwapParams::new("USDC", "SOL", 200.0))
            .await
            .unwrap();

        assert!(result.swap_id.starts_with("swap_"));
        assert_eq!(result.status, SwapState::Completed);
        assert!(approx(result.output_amount, 20_000.0));
        assert_ne!(result.zk_proof, result.routing_proof);
        assert_eq!(
            ledger.submitted()[0].operation.asset.as_deref(),
            Some(USDC_MINT)
        );

        let status = client.get_swap_status(&result.swap_id).await.unwrap();
        assert_eq!(status.swap_id, result.swap_id);
    }

    #[tokio::test]
    async fn test_swap_from_sol_checks_lamports() {
        let ledger = Arc::new(MockLedger::new().with_lamports(5_000_000_000));
        let client = client(ledger.clone());

        client
            .execute_swap(&SwapParams::new("SOL", "USDC", 2.0))
            .await
            .unwrap();

        let operation = &ledger.submitted()[0].operation;
        assert_eq!(operation.asset.as_deref(), Some(NATIVE_ASSET));
        assert_eq!(operation.output_asset.as_deref(), Some(USDC_MINT));
        assert!(approx(operation.output_amount.unwrap(), 0.02));
        assert_eq!(ledger.balance_calls(), 1);

        let err = client
            .execute_swap(&SwapParams::new("SOL", "USDC", 6.0))
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::InsufficientFunds(_)));
    }

    #[test]
    fn test_pool_info() {
        let client = client(Arc::new(MockLedger::new()));
        let pool = client.get_pool_info("SOL", "USDC").unwrap();
        assert!(approx(pool.liquidity_b, 10_000.0));
        assert_eq!(pool.fee, 0.003);
        assert_eq!(pool.apy, 12.5);
        assert!(client.get_pool_info("SOL", "XYZ").is_err());
        assert_eq!(client.supported_tokens().len(), 6);
    }
}
