//! Seeded fixture payloads for populating demo and test ledgers.
//!
//! The payloads are arbitrary application data; the ledger never looks inside them.

use hl_canon::HashAlgorithm;
use hl_ledger::{BuildError, Payload, Timestamp};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

const BLUEPRINT_IDS: &[&str] = &[
    "vendor-negotiation",
    "purchase-approval",
    "delivery-confirmation",
    "code-review-pipeline",
    "release-approval",
    "incident-escalation",
    "invoice-matching",
    "kyc-verification",
    "audit-evidence",
    "refund-approval",
    "sla-compliance",
    "insurance-adjudication",
];

const AGENT_IDS: &[&str] = &[
    "agent-alpha",
    "agent-bravo",
    "agent-charlie",
    "agent-delta",
    "agent-echo",
    "agent-foxtrot",
    "agent-golf",
    "agent-hotel",
];

const TRUST_LEVELS: &[&str] = &["untrusted", "provisional", "trusted", "senior"];

const LANGUAGES: &[&str] = &["python", "typescript", "go", "rust", "java", "elixir"];

const SERVICES: &[&str] = &[
    "api-gateway",
    "settlement-engine",
    "webhook-relay",
    "badge-service",
    "dashboard",
];

const FRAMEWORKS: &[(&str, &str)] = &[
    ("langgraph", "NodeWrapper"),
    ("crewai", "TaskCallback"),
    ("autogen", "ReplyCallback"),
    ("haystack", "SettlementComponent"),
];

const BUG_DESCRIPTIONS: &[&str] = &[
    "Off-by-one in pagination cursor",
    "Race condition in concurrent settlement writes",
    "Missing null check on optional agent_id",
    "Timezone mismatch in timestamp comparison",
    "Memory leak in long-running webhook listener",
];

const TOPICS: &[&str] = &[
    "Evaluate vendor compliance for Q1 procurement",
    "Verify KYC documents for onboarding batch",
    "Triage incident severity for payment gateway",
    "Validate IoT sensor readings against thresholds",
    "Assess insurance claim for property damage",
];

/// Build a [`Payload`] from `"key": value` pairs.
macro_rules! payload {
    ($($key:literal: $value:expr),* $(,)?) => {{
        let mut map = Payload::new();
        $(map.insert($key.to_string(), Value::from($value));)*
        map
    }};
}

/// Payload families the generator draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FixtureKind {
    BlueprintFork,
    GuardAction,
    TrustCheck,
    CreditTopup,
    ReceiptVerify,
    AdapterSettlement,
    CodeGeneration,
    CodeReview,
    BugFix,
    QaVerification,
    Deployment,
}

impl FixtureKind {
    /// Every kind with its relative frequency.
    pub const CATALOG: [(FixtureKind, usize); 11] = [
        (FixtureKind::BlueprintFork, 20),
        (FixtureKind::GuardAction, 18),
        (FixtureKind::TrustCheck, 12),
        (FixtureKind::CreditTopup, 10),
        (FixtureKind::ReceiptVerify, 8),
        (FixtureKind::AdapterSettlement, 15),
        (FixtureKind::CodeGeneration, 16),
        (FixtureKind::CodeReview, 14),
        (FixtureKind::BugFix, 12),
        (FixtureKind::QaVerification, 14),
        (FixtureKind::Deployment, 8),
    ];

    /// Value of the payload's `type` key.
    pub fn type_name(&self) -> &'static str {
        match self {
            FixtureKind::BlueprintFork => "blueprint-fork",
            FixtureKind::GuardAction => "guard-action",
            FixtureKind::TrustCheck => "trust-check",
            FixtureKind::CreditTopup => "credit-topup",
            FixtureKind::ReceiptVerify => "receipt-verify",
            FixtureKind::AdapterSettlement => "adapter-settlement",
            FixtureKind::CodeGeneration => "code-generation",
            FixtureKind::CodeReview => "code-review",
            FixtureKind::BugFix => "bug-fix",
            FixtureKind::QaVerification => "qa-verification",
            FixtureKind::Deployment => "deployment",
        }
    }
}

/// One generated record, ready to append.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureRecord {
    pub kind: FixtureKind,
    pub timestamp: Timestamp,
    pub task_id: String,
    pub payload: Payload,
}

/// Deterministic payload generator: the same seed always yields the same records.
pub struct FixtureGenerator {
    rng: StdRng,
}

impl FixtureGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate `count` records with timestamps advancing 5-120 s from `start`.
    pub fn generate(&mut self, count: usize, start: f64) -> Result<Vec<FixtureRecord>, BuildError> {
        let mut tasks = Vec::with_capacity(count);
        let mut serial = [0usize; FixtureKind::CATALOG.len()];
        while tasks.len() < count {
            for (slot, (kind, weight)) in FixtureKind::CATALOG.iter().enumerate() {
                for _ in 0..*weight {
                    serial[slot] += 1;
                    tasks.push((*kind, serial[slot]));
                }
            }
        }
        tasks.shuffle(&mut self.rng);
        tasks.truncate(count);

        let mut clock = start;
        let mut records = Vec::with_capacity(count);
        for (kind, idx) in tasks {
            clock += self.rng.random_range(5.0..120.0);
            let (task_id, payload) = self.payload(kind, idx);
            records.push(FixtureRecord {
                kind,
                timestamp: Timestamp::from_secs_f64(clock)?,
                task_id,
                payload,
            });
        }
        Ok(records)
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.random_range(0..items.len())]
    }

    fn payload(&mut self, kind: FixtureKind, idx: usize) -> (String, Payload) {
        let ty = kind.type_name();
        let (task_id, payload) = match kind {
            FixtureKind::BlueprintFork => {
                let blueprint = self.pick(BLUEPRINT_IDS);
                (
                    format!("fork-{blueprint}-{idx}"),
                    payload! {
                        "type": ty,
                        "blueprint_id": blueprint,
                        "agent_id": self.pick(AGENT_IDS),
                        "step_count": self.rng.random_range(2..=4),
                        "credit_cost": round_to(self.rng.random_range(2.0..8.0), 1),
                    },
                )
            }
            FixtureKind::GuardAction => {
                let (action, data) = match self.rng.random_range(0..4) {
                    0 => ("delete-records", json!({"table": "users", "count": 150})),
                    1 => ("deploy-production", json!({"service": "api-gateway", "version": "2.4.1"})),
                    2 => ("transfer-funds", json!({"amount": 25000, "currency": "USD", "to": "vendor-88"})),
                    _ => ("rotate-secrets", json!({"service": "auth", "key_count": 4})),
                };
                (
                    format!("guard-{action}-{idx}"),
                    payload! {
                        "type": ty,
                        "agent_id": self.pick(AGENT_IDS),
                        "action": action,
                        "data": data,
                        "approved": self.rng.random_bool(0.85),
                    },
                )
            }
            FixtureKind::TrustCheck => {
                let required = self.rng.random_range(0..TRUST_LEVELS.len());
                let actual = self.rng.random_range(0..TRUST_LEVELS.len());
                (
                    format!("trust-check-{idx}"),
                    payload! {
                        "type": ty,
                        "agent_id": self.pick(AGENT_IDS),
                        "min_trust": TRUST_LEVELS[required],
                        "trust_level": TRUST_LEVELS[actual],
                        "meets_requirement": actual >= required,
                    },
                )
            }
            FixtureKind::CreditTopup => {
                let agent = self.pick(AGENT_IDS);
                let amount = [10, 25, 50, 100, 250, 500][self.rng.random_range(0..6)];
                let amount_f = amount as f64;
                (
                    format!("topup-{agent}-{idx}"),
                    payload! {
                        "type": ty,
                        "agent_id": agent,
                        "amount": amount,
                        "new_balance": round_to(self.rng.random_range(amount_f..amount_f + 500.0), 2),
                    },
                )
            }
            FixtureKind::ReceiptVerify => (
                format!("verify-receipt-{idx}"),
                payload! {
                    "type": ty,
                    "hash": HashAlgorithm::Sha256.digest_hex(format!("receipt-{idx}").as_bytes()),
                    "found": self.rng.random_bool(0.8),
                    "lookup_source": self.pick(&["sdk", "api", "mcp"]),
                },
            ),
            FixtureKind::AdapterSettlement => {
                let (framework, adapter) = FRAMEWORKS[self.rng.random_range(0..FRAMEWORKS.len())];
                (
                    format!("adapter-{framework}-{idx}"),
                    payload! {
                        "type": ty,
                        "framework": framework,
                        "adapter_class": adapter,
                        "event": self.pick(&["run_complete", "tool_call", "step_complete"]),
                        "confidence": round_to(self.rng.random_range(0.8..1.0), 3),
                    },
                )
            }
            FixtureKind::CodeGeneration => {
                let language = self.pick(LANGUAGES);
                (
                    format!("codegen-{language}-{idx}"),
                    payload! {
                        "type": ty,
                        "language": language,
                        "lines_generated": self.rng.random_range(15..=200),
                        "complexity": self.pick(&["trivial", "simple", "moderate", "complex"]),
                        "tests_included": self.rng.random_bool(0.7),
                    },
                )
            }
            FixtureKind::CodeReview => {
                let language = self.pick(LANGUAGES);
                (
                    format!("review-{language}-{idx}"),
                    payload! {
                        "type": ty,
                        "language": language,
                        "files_reviewed": self.rng.random_range(1..=8),
                        "issues_found": self.rng.random_range(0..=5),
                        "severity_max": self.pick(&["info", "warning", "error", "critical"]),
                        "approved": self.rng.random_bool(0.75),
                    },
                )
            }
            FixtureKind::BugFix => (
                format!("bugfix-{idx}"),
                payload! {
                    "type": ty,
                    "language": self.pick(LANGUAGES),
                    "description": self.pick(BUG_DESCRIPTIONS),
                    "lines_changed": self.rng.random_range(1..=50),
                    "tests_added": self.rng.random_range(0..=3),
                },
            ),
            FixtureKind::QaVerification => (
                format!("qa-{idx}"),
                payload! {
                    "type": ty,
                    "question": self.pick(TOPICS),
                    "agents_consulted": self.rng.random_range(2..=4),
                    "consensus_reached": self.rng.random_bool(0.9),
                    "confidence": round_to(self.rng.random_range(0.75..0.99), 3),
                },
            ),
            FixtureKind::Deployment => {
                let service = self.pick(SERVICES);
                let status = if self.rng.random_bool(0.95) {
                    "success"
                } else {
                    "rollback"
                };
                (
                    format!("deploy-{service}-{idx}"),
                    payload! {
                        "type": ty,
                        "service": service,
                        "version": format!(
                            "{}.{}.{}",
                            self.rng.random_range(1..=3),
                            self.rng.random_range(0..=9),
                            self.rng.random_range(0..=20)
                        ),
                        "environment": self.pick(&["staging", "production"]),
                        "status": status,
                    },
                )
            }
        };
        (task_id, payload)
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}
