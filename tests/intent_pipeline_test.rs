//! End-to-end: text in, swarm bundle recorded on the dry-run ledger.

use alloy_primitives::{Address, U256};
use metaarmy::domain::models::{ContractsConfig, ExecuteBundleCall, TargetPolicy};
use metaarmy::infrastructure::InMemoryBundleLedger;
use metaarmy::services::{
    extract_intent, generate_swarm_description, is_deployment_intent, scale_amount, AssemblyError,
    TransactionAssembler,
};
use metaarmy::{Action, BundleSubmitter, Priority, SwarmIntent, Task};

fn assembler(policy: TargetPolicy) -> TransactionAssembler {
    TransactionAssembler::new(ContractsConfig::default(), policy)
}

#[test]
fn test_classifier_examples() {
    assert!(is_deployment_intent("swap 100 USDC for ETH"));
    assert!(!is_deployment_intent("hello"));
}

#[test]
fn test_two_clause_request() {
    let intent = extract_intent("invest 50 USDC and vote on proposal 1");
    let actions: Vec<Action> = intent.tasks.iter().map(|t| t.action).collect();
    assert_eq!(actions, vec![Action::Invest, Action::Vote]);
    assert_eq!(intent.tasks[0].amount, "50");
    assert!(intent.is_bundle());
}

#[test]
fn test_defaults_for_vague_request() {
    let intent = extract_intent("grow my savings");
    assert_eq!(intent.task_count(), 1);
    assert_eq!(intent.tasks[0].amount, "100");
    assert_eq!(intent.tasks[0].target, "Aave");
    assert_eq!(intent.tasks[0].asset, "USDC");
}

#[test]
fn test_description_counts_tasks() {
    let single = extract_intent("invest 50 USDC in aave");
    assert!(!generate_swarm_description(&single).contains("Swarm of"));

    let triple = extract_intent("invest 50 USDC in aave, swap 1 ETH on uniswap and vote on proposal 3");
    assert_eq!(triple.task_count(), 3);
    assert!(generate_swarm_description(&triple).contains("Swarm of 3"));
}

#[test]
fn test_assembly_preserves_order_and_scales_amounts() {
    let intent = extract_intent("invest 12 USDC in aave and stake 12 ETH on lido");
    let actions = assembler(TargetPolicy::Strict).assemble(&intent).unwrap();

    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0].amount, U256::from(12_000_000u64));
    assert_eq!(
        actions[1].amount,
        U256::from(12u64) * U256::from(10u64).pow(U256::from(18u64))
    );
    assert_eq!(
        Some(actions[0].target),
        ContractsConfig::default().protocol_address("aave")
    );
    assert_eq!(
        Some(actions[1].target),
        ContractsConfig::default().protocol_address("lido")
    );
}

#[test]
fn test_unknown_protocol_is_strict_error() {
    let task = Task {
        id: 1,
        action: Action::Yield,
        asset: "DAI".to_string(),
        target: "Balancer".to_string(),
        amount: "10".to_string(),
        conditions: Vec::new(),
        requires_zk: false,
        target_address: None,
    };
    let intent = SwarmIntent::new("farm 10 DAI on balancer", vec![task], Priority::default());
    match assembler(TargetPolicy::Strict).assemble(&intent) {
        Err(AssemblyError::UnresolvedTarget { protocol, .. }) => assert_eq!(protocol, "Balancer"),
        other => panic!("expected unresolved target, got {other:?}"),
    }

    let actions = assembler(TargetPolicy::ZeroAddress).assemble(&intent).unwrap();
    assert_eq!(actions[0].target, Address::ZERO);
}

#[test]
fn test_scale_amount_edges() {
    assert_eq!(scale_amount("1.5", 6), Some(U256::from(1_500_000u64)));
    assert_eq!(scale_amount("0.0000001", 6), Some(U256::ZERO));
    assert_eq!(scale_amount("1.2.3", 6), None);
}

#[tokio::test]
async fn test_bundle_lifecycle_on_ledger() {
    let ledger = InMemoryBundleLedger::new();
    let user = Address::repeat_byte(0x33);
    let intent = extract_intent("invest 50 USDC in aave and swap 1 ETH on uniswap privately");

    let call = assembler(TargetPolicy::Strict).build_call(&intent).unwrap();
    assert_eq!(call.goal, intent.goal);
    assert!(call.actions[1].requires_zk);

    let receipt = ledger.create_swarm_bundle(user, call).await.unwrap();
    assert_eq!(receipt.total_actions, 2);

    ledger
        .execute_bundle(
            user,
            ExecuteBundleCall::with_placeholder_proofs(receipt.bundle_id, receipt.total_actions),
        )
        .await
        .unwrap();

    let record = ledger.swarm_bundle(receipt.bundle_id).await.unwrap().unwrap();
    assert!(!record.active);
    assert_eq!(record.executed_actions, 2);
}
