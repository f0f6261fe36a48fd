//! Chat session orchestration.
//!
//! Drives one [`ChatSession`] through classify → resolve → compose →
//! review → submit. All state lives in the session passed in; the service
//! itself holds only shared collaborators.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, instrument, warn};

use super::bundle_composer::generate_swarm_description;
use super::intent_classifier::is_deployment_intent;
use super::intent_resolver::FallbackIntentResolver;
use super::transaction_assembler::TransactionAssembler;
use crate::domain::errors::DomainError;
use crate::domain::models::settings::MAX_EXECUTION_DELAY_SECS;
use crate::domain::models::{
    AgentSettings, BundleReceipt, ChatSession, ExecuteBundleCall, Notice, PendingState, Role,
    SwarmIntent,
};
use crate::domain::ports::{BundleSubmitter, LlmClient};

/// Reply used when no conversational model is available.
pub const FALLBACK_REPLY: &str = "I can deploy agents for you. Try something like \
\"invest 50 USDC in Aave and vote on proposal 1\".";

const EMPTY_INTENT_REPLY: &str = "No actionable tasks detected.";
const UNBUILDABLE_REPLY: &str = "I can't deploy that swarm:";

/// What the assistant answered to one user message.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChatReply {
    /// Plain conversational answer
    Conversation { text: String },
    /// A swarm waiting for `/confirm` or `/cancel`
    Proposal {
        description: String,
        intent: SwarmIntent,
    },
}

impl ChatReply {
    pub fn text(&self) -> &str {
        match self {
            Self::Conversation { text } => text,
            Self::Proposal { description, .. } => description,
        }
    }

    pub fn intent(&self) -> Option<&SwarmIntent> {
        match self {
            Self::Proposal { intent, .. } => Some(intent),
            Self::Conversation { .. } => None,
        }
    }
}

pub struct ChatService {
    resolver: FallbackIntentResolver,
    chat_llm: Option<Arc<dyn LlmClient>>,
    llm_timeout: Duration,
    assembler: TransactionAssembler,
    submitter: Arc<dyn BundleSubmitter>,
    settings: AgentSettings,
}

impl ChatService {
    pub fn new(
        resolver: FallbackIntentResolver,
        assembler: TransactionAssembler,
        submitter: Arc<dyn BundleSubmitter>,
    ) -> Self {
        Self {
            resolver,
            chat_llm: None,
            llm_timeout: Duration::from_secs(30),
            assembler,
            submitter,
            settings: AgentSettings::default(),
        }
    }

    /// Use a model for non-deployment messages.
    #[must_use]
    pub fn with_chat_llm(mut self, llm: Arc<dyn LlmClient>, timeout: Duration) -> Self {
        self.chat_llm = Some(llm);
        self.llm_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: AgentSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    /// Process one user message.
    #[instrument(skip(self, session, text), fields(session_id = %session.id))]
    pub async fn handle_message(&self, session: &mut ChatSession, text: &str) -> ChatReply {
        session.push(Role::User, text);

        let reply = if is_deployment_intent(text) {
            let intent = self.resolver.resolve_intent(text).await;
            if intent.is_empty() {
                ChatReply::Conversation {
                    text: EMPTY_INTENT_REPLY.to_string(),
                }
            } else if let Err(err) = self.assembler.validate(&intent) {
                warn!(error = %err, "proposal cannot be assembled");
                ChatReply::Conversation {
                    text: format!("{UNBUILDABLE_REPLY} {err}."),
                }
            } else {
                let description = generate_swarm_description(&intent);
                info!(tasks = intent.task_count(), "swarm proposed");
                session.pending = PendingState::AwaitingConfirmation(intent.clone());
                ChatReply::Proposal {
                    description,
                    intent,
                }
            }
        } else {
            ChatReply::Conversation {
                text: self.converse(text).await,
            }
        };

        session.push(Role::Assistant, reply.text());
        reply
    }

    async fn converse(&self, text: &str) -> String {
        let Some(llm) = &self.chat_llm else {
            return FALLBACK_REPLY.to_string();
        };

        let prompt = format!(
            "You are MetaArmy, an assistant that deploys DeFi agents. \
Answer briefly and suggest a concrete request when it helps.\n\nUser: {text}"
        );
        match tokio::time::timeout(self.llm_timeout, llm.generate(&prompt)).await {
            Ok(Ok(answer)) if !answer.trim().is_empty() => answer.trim().to_string(),
            Ok(Ok(_)) => {
                warn!(model = llm.model_name(), "empty conversational reply, using fallback text");
                FALLBACK_REPLY.to_string()
            }
            Ok(Err(err)) => {
                warn!(model = llm.model_name(), error = %err, "conversational reply failed, using fallback text");
                FALLBACK_REPLY.to_string()
            }
            Err(_) => {
                warn!(
                    model = llm.model_name(),
                    timeout_secs = self.llm_timeout.as_secs(),
                    "conversational reply timed out, using fallback text"
                );
                FALLBACK_REPLY.to_string()
            }
        }
    }

    /// Submit the pending intent as a swarm bundle.
    ///
    /// Precondition failures (nothing pending, no wallet) leave the session
    /// untouched. Everything up to bundle creation is final: the session
    /// ends up `Submitted` or `Failed`, and nothing is retried. A failed
    /// auto-execute does not fail the confirmation; its notice is queued on
    /// the session and the bundle stays `Submitted` for a later `execute`.
    #[instrument(skip(self, session), fields(session_id = %session.id))]
    pub async fn confirm(&self, session: &mut ChatSession) -> Result<BundleReceipt, Notice> {
        let Some(intent) = session.pending_intent().cloned() else {
            return Err(Notice::error(
                "Nothing to confirm",
                DomainError::NoPendingIntent.to_string(),
            ));
        };
        let Some(wallet) = session.wallet else {
            return Err(Notice::error(
                "Wallet required",
                DomainError::WalletNotConnected.to_string(),
            ));
        };

        let max = self.settings.max_swarm_size;
        if intent.task_count() > max {
            let err = DomainError::SwarmTooLarge {
                requested: intent.task_count(),
                max,
            };
            return Err(Self::fail(session, Notice::error("Swarm too large", err.to_string())));
        }

        let call = match self.assembler.build_call(&intent) {
            Ok(call) => call,
            Err(err) => {
                warn!(error = %err, "bundle assembly failed");
                return Err(Self::fail(
                    session,
                    Notice::error("Could not build transaction", err.to_string()),
                ));
            }
        };

        let receipt = match self.submitter.create_swarm_bundle(wallet, call).await {
            Ok(receipt) => receipt,
            Err(err) => {
                warn!(error = %err, "bundle submission failed");
                return Err(Self::fail(
                    session,
                    Notice::error("Transaction failed", err.user_message()),
                ));
            }
        };

        info!(bundle_id = %receipt.bundle_id, actions = receipt.total_actions, "swarm bundle created");
        session.pending = PendingState::Submitted(receipt.clone());
        session.push(
            Role::System,
            format!("Swarm bundle {} created.", receipt.bundle_id),
        );

        if self.settings.auto_execute {
            if let Err(notice) = self.execute(session).await {
                session.notices.push(notice);
            }
        }

        Ok(receipt)
    }

    /// Execute the submitted bundle with placeholder proof hashes.
    ///
    /// On failure the session keeps its `Submitted` receipt so the call can
    /// be repeated.
    #[instrument(skip(self, session), fields(session_id = %session.id))]
    pub async fn execute(&self, session: &mut ChatSession) -> Result<(), Notice> {
        let PendingState::Submitted(receipt) = &session.pending else {
            return Err(Notice::error(
                "Nothing to execute",
                "Confirm a swarm before executing it.",
            ));
        };
        let receipt = receipt.clone();

        let delay = self.execution_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let call = ExecuteBundleCall::with_placeholder_proofs(receipt.bundle_id, receipt.total_actions);
        match self.submitter.execute_bundle(receipt.user, call).await {
            Ok(()) => {
                session.push(
                    Role::System,
                    format!("Swarm bundle {} executed.", receipt.bundle_id),
                );
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, bundle_id = %receipt.bundle_id, "bundle execution failed");
                let notice = Notice::error("Execution failed", err.user_message());
                session.push(Role::System, format!("{}: {}", notice.title, notice.message));
                Err(notice)
            }
        }
    }

    /// Wait before `execute`, capped even for unvalidated settings.
    pub fn execution_delay(&self) -> Duration {
        Duration::from_secs(self.settings.execution_delay.min(MAX_EXECUTION_DELAY_SECS))
    }

    /// Drop the pending intent. Returns whether there was one.
    pub fn cancel(&self, session: &mut ChatSession) -> bool {
        if session.pending_intent().is_none() {
            return false;
        }
        session.pending = PendingState::Idle;
        session.push(Role::System, "Swarm deployment cancelled.");
        true
    }

    fn fail(session: &mut ChatSession, notice: Notice) -> Notice {
        session.push(Role::System, format!("{}: {}", notice.title, notice.message));
        session.pending = PendingState::Failed(notice.clone());
        notice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{CreateSwarmBundleCall, SwarmBundleRecord};
    use crate::domain::ports::{LlmError, SubmissionError};
    use alloy_primitives::{Address, B256};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records calls and answers with a fixed outcome.
    struct ScriptedSubmitter {
        outcome: Result<(), SubmissionError>,
        calls: AtomicUsize,
    }

    impl ScriptedSubmitter {
        fn new(outcome: Result<(), SubmissionError>) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl BundleSubmitter for ScriptedSubmitter {
        async fn create_swarm_bundle(
            &self,
            user: Address,
            call: CreateSwarmBundleCall,
        ) -> Result<BundleReceipt, SubmissionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone().map(|()| BundleReceipt {
                bundle_id: B256::repeat_byte(7),
                user,
                total_actions: call.actions.len(),
                submitted_at: Utc::now(),
            })
        }

        async fn execute_bundle(
            &self,
            _user: Address,
            _call: ExecuteBundleCall,
        ) -> Result<(), SubmissionError> {
            self.outcome.clone()
        }

        async fn swarm_bundle(
            &self,
            _bundle_id: B256,
        ) -> Result<Option<SwarmBundleRecord>, SubmissionError> {
            Ok(None)
        }
    }

    struct BrokenLlm;

    #[async_trait]
    impl LlmClient for BrokenLlm {
        fn model_name(&self) -> &str {
            "broken"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::Api {
                status: 500,
                message: "boom".to_string(),
            })
        }
    }

    fn service(submitter: Arc<ScriptedSubmitter>) -> ChatService {
        ChatService::new(
            FallbackIntentResolver::heuristic_only(),
            TransactionAssembler::default(),
            submitter,
        )
    }

    fn wallet() -> Option<Address> {
        Some(Address::repeat_byte(0x11))
    }

    #[tokio::test]
    async fn test_deployment_message_creates_proposal() {
        let svc = service(ScriptedSubmitter::new(Ok(())));
        let mut session = ChatSession::new(wallet());
        let reply = svc.handle_message(&mut session, "swap 100 USDC for ETH on uniswap").await;

        assert!(matches!(reply, ChatReply::Proposal { .. }));
        assert!(session.pending_intent().is_some());
        assert_eq!(session.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_chat_message_without_model_uses_fallback() {
        let svc = service(ScriptedSubmitter::new(Ok(())));
        let mut session = ChatSession::new(None);
        let reply = svc.handle_message(&mut session, "hello").await;
        assert_eq!(reply.text(), FALLBACK_REPLY);
        assert_eq!(session.pending, PendingState::Idle);
    }

    #[tokio::test]
    async fn test_chat_model_failure_uses_fallback() {
        let svc = service(ScriptedSubmitter::new(Ok(())))
            .with_chat_llm(Arc::new(BrokenLlm), Duration::from_secs(1));
        let mut session = ChatSession::new(None);
        let reply = svc.handle_message(&mut session, "what can you do?").await;
        assert_eq!(reply.text(), FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_confirm_submits_once() {
        let submitter = ScriptedSubmitter::new(Ok(()));
        let svc = service(submitter.clone());
        let mut session = ChatSession::new(wallet());
        svc.handle_message(&mut session, "invest 50 USDC in aave and stake 1 ETH on lido")
            .await;

        let receipt = svc.confirm(&mut session).await.unwrap();
        assert_eq!(receipt.total_actions, 2);
        assert!(matches!(session.pending, PendingState::Submitted(_)));
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_confirm_without_wallet_keeps_pending() {
        let svc = service(ScriptedSubmitter::new(Ok(())));
        let mut session = ChatSession::new(None);
        svc.handle_message(&mut session, "swap 100 USDC on uniswap").await;

        let notice = svc.confirm(&mut session).await.unwrap_err();
        assert_eq!(notice.title, "Wallet required");
        assert!(session.pending_intent().is_some());
    }

    #[tokio::test]
    async fn test_confirm_with_nothing_pending() {
        let svc = service(ScriptedSubmitter::new(Ok(())));
        let mut session = ChatSession::new(wallet());
        assert!(svc.confirm(&mut session).await.is_err());
        assert_eq!(session.pending, PendingState::Idle);
    }

    #[tokio::test]
    async fn test_rejection_marks_failed_without_retry() {
        let submitter = ScriptedSubmitter::new(Err(SubmissionError::UserRejected));
        let svc = service(submitter.clone());
        let mut session = ChatSession::new(wallet());
        svc.handle_message(&mut session, "swap 100 USDC on uniswap").await;

        let notice = svc.confirm(&mut session).await.unwrap_err();
        assert_eq!(notice.message, SubmissionError::UserRejected.user_message());
        assert!(matches!(session.pending, PendingState::Failed(_)));
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_swarm_size_limit() {
        let settings = AgentSettings {
            max_swarm_size: 1,
            ..AgentSettings::default()
        };
        let submitter = ScriptedSubmitter::new(Ok(()));
        let svc = service(submitter.clone()).with_settings(settings);
        let mut session = ChatSession::new(wallet());
        svc.handle_message(&mut session, "invest 50 USDC in aave and stake 1 ETH on lido")
            .await;

        let notice = svc.confirm(&mut session).await.unwrap_err();
        assert_eq!(notice.title, "Swarm too large");
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_discards_pending() {
        let svc = service(ScriptedSubmitter::new(Ok(())));
        let mut session = ChatSession::new(wallet());
        svc.handle_message(&mut session, "swap 100 USDC on uniswap").await;

        assert!(svc.cancel(&mut session));
        assert_eq!(session.pending, PendingState::Idle);
        assert!(!svc.cancel(&mut session));
    }

    /// Creates bundles but refuses to execute the first `failures` times.
    struct FlakyExecutor {
        failures: AtomicUsize,
        executions: AtomicUsize,
    }

    #[async_trait]
    impl BundleSubmitter for FlakyExecutor {
        async fn create_swarm_bundle(
            &self,
            user: Address,
            call: CreateSwarmBundleCall,
        ) -> Result<BundleReceipt, SubmissionError> {
            Ok(BundleReceipt {
                bundle_id: B256::repeat_byte(3),
                user,
                total_actions: call.actions.len(),
                submitted_at: Utc::now(),
            })
        }

        async fn execute_bundle(
            &self,
            _user: Address,
            _call: ExecuteBundleCall,
        ) -> Result<(), SubmissionError> {
            self.executions.fetch_add(1, Ordering::SeqCst);
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(SubmissionError::UserRejected);
            }
            Ok(())
        }

        async fn swarm_bundle(
            &self,
            _bundle_id: B256,
        ) -> Result<Option<SwarmBundleRecord>, SubmissionError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_failed_auto_execute_keeps_bundle_reachable() {
        let submitter = Arc::new(FlakyExecutor {
            failures: AtomicUsize::new(1),
            executions: AtomicUsize::new(0),
        });
        let settings = AgentSettings {
            auto_execute: true,
            ..AgentSettings::default()
        };
        let svc = ChatService::new(
            FallbackIntentResolver::heuristic_only(),
            TransactionAssembler::default(),
            submitter.clone(),
        )
        .with_settings(settings);
        let mut session = ChatSession::new(wallet());
        svc.handle_message(&mut session, "swap 100 USDC on uniswap").await;

        let receipt = svc.confirm(&mut session).await.unwrap();
        assert_eq!(session.pending, PendingState::Submitted(receipt.clone()));
        let notices = session.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "Execution failed");

        svc.execute(&mut session).await.unwrap();
        assert_eq!(submitter.executions.load(Ordering::SeqCst), 2);
        assert_eq!(session.pending, PendingState::Submitted(receipt));
    }

    #[tokio::test]
    async fn test_unbuildable_intent_is_not_proposed() {
        let contracts = crate::domain::models::ContractsConfig {
            swarm_bundle: None,
            protocols: std::collections::HashMap::new(),
        };
        let svc = ChatService::new(
            FallbackIntentResolver::heuristic_only(),
            TransactionAssembler::new(contracts, crate::domain::models::TargetPolicy::Strict),
            ScriptedSubmitter::new(Ok(())),
        );
        let mut session = ChatSession::new(wallet());
        let reply = svc.handle_message(&mut session, "invest 50 USDC on yearn").await;

        assert!(matches!(reply, ChatReply::Conversation { .. }));
        assert!(reply.text().starts_with(UNBUILDABLE_REPLY));
        assert!(reply.text().contains("Yearn"));
        assert_eq!(session.pending, PendingState::Idle);
    }

    #[test]
    fn test_execution_delay_is_capped() {
        let settings = AgentSettings {
            execution_delay: u64::MAX,
            ..AgentSettings::default()
        };
        let svc = service(ScriptedSubmitter::new(Ok(()))).with_settings(settings);
        assert_eq!(
            svc.execution_delay(),
            Duration::from_secs(MAX_EXECUTION_DELAY_SECS)
        );

        let svc = service(ScriptedSubmitter::new(Ok(())));
        assert!(svc.execution_delay().is_zero());
    }

    #[tokio::test]
    async fn test_auto_execute_runs_after_create() {
        let settings = AgentSettings {
            auto_execute: true,
            ..AgentSettings::default()
        };
        let svc = service(ScriptedSubmitter::new(Ok(()))).with_settings(settings);
        let mut session = ChatSession::new(wallet());
        svc.handle_message(&mut session, "swap 100 USDC on uniswap").await;

        svc.confirm(&mut session).await.unwrap();
        let last = session.messages.last().map(|m| m.content.clone()).unwrap_or_default();
        assert!(last.ends_with("executed."));
    }
}
