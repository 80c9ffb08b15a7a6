//! Demo data for the knowledge base

use ragserve_core::{Metadata, Result, VectorStore};
use serde_json::json;

/// Store a small demo dataset so the agent can be exercised without a
/// prior crawl. Returns the number of documents inserted.
pub async fn seed_example_documents<V: VectorStore>(store: &V) -> Result<usize> {
    let documents = vec![
        "Employee profile: Name: Anna Schneider. Role: Data Analyst. Team: Marketing \
         Analytics. Skills: SQL, Python (Pandas, Altair), dbt. Projects: campaign \
         dashboard, churn analysis. Location: Stuttgart. Availability: 80%. Contact: \
         lead.marketing.analytics@example.com"
            .to_string(),
        "Employee profile: Name: Mehmet Yilmaz. Role: ML Engineer. Team: AI Platform. \
         Skills: LangGraph, OpenAI Agents SDK, ChromaDB, Kubernetes, CI/CD. Projects: \
         RAG bot for customer service, event-streaming ingestion. Location: remote (DE). \
         Availability: 60%."
            .to_string(),
        "Employee profile: Name: Julia Roth. Role: Product Owner Conversational AI. \
         Team: Digital Services. Skills: Cognigy, Voiceflow, evaluation frameworks, \
         GDPR assessments. Projects: Support Assistant v2, NLU intent catalog. \
         Location: Munich. Availability: 100%."
            .to_string(),
        "Policy: data classification. Levels: public, internal, confidential, strictly \
         confidential. Strictly confidential: no use in external AI services. \
         Confidential: use only with approved providers and audit logging enabled. \
         Internal: allowed in experiments, but no personal data."
            .to_string(),
        "FAQ: How do I choose a framework for an AI agent? For quick prototypes: \
         OpenAI Agents SDK plus ChromaDB. For complex orchestration: LangGraph. For \
         voice and contact-center work: Cognigy. For no-code automation chains: n8n \
         with generative nodes."
            .to_string(),
    ];
    let metadatas: Vec<Metadata> = [
        json!({"entity": "Anna Schneider", "type": "user_profile"}),
        json!({"entity": "Mehmet Yilmaz", "type": "user_profile"}),
        json!({"entity": "Julia Roth", "type": "user_profile"}),
        json!({"entity": "Policy Team", "type": "policy"}),
        json!({"entity": "AI Practices", "type": "faq"}),
    ]
    .into_iter()
    .map(|value| value.as_object().cloned().unwrap_or_default())
    .collect();

    let inserted = documents.len();
    store.add_documents(documents, Some(metadatas), None).await?;
    Ok(inserted)
}
