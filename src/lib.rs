//! Shared fixtures for the casegen integration tests and benches

use std::sync::Arc;

use casegen_domain::{NewRequirement, PipelineStore, RequirementId};
use casegen_generation::GenerationOrchestrator;
use casegen_persistence::InMemoryPipelineStore;

/// Memory-seat requirement with one position range
pub const MEMORY_REQUIREMENT: &str = "座椅记忆功能要求：支持3组记忆位置存储，前后位置0-250mm";

/// A requirement touching several feature categories, limits and a dependency
pub const MULTI_FEATURE_REQUIREMENT: &str = "座椅加热功能是核心需求，温度范围30-45°，加热需要在5分钟内完成。\
座椅通风功能支持3档风扇调节，通风与加热不能同时开启。\
按摩功能提供5种按摩模式，按摩强度1-10级。\
安全保护需要基于座椅控制系统，过载时必须在2秒内停止。";

/// An in-memory store holding one requirement, and a default orchestrator over it
pub fn seeded_pipeline(
    content: &str,
) -> anyhow::Result<(Arc<InMemoryPipelineStore>, GenerationOrchestrator, RequirementId)> {
    let store = Arc::new(InMemoryPipelineStore::new());
    let requirement = store.insert_requirement(NewRequirement::new("座椅需求", content, "qa"))?;
    let orchestrator = GenerationOrchestrator::with_defaults(store.clone())?;
    Ok((store, orchestrator, requirement.id))
}
