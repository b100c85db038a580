// [apps/gateway/src/services/sync/mod.rs]
/*!
 * MODULE: SYNC DOMAIN MODULES
 * LAYER: APPLICATION SERVICE (L4)
 * RESPONSIBILITY: BARREL FOR THE PER-DOMAIN SYNC IMPLEMENTATIONS
 */

pub mod engine;
pub mod finance;
pub mod hadith;
pub mod quran;
pub mod zakat;

use syncd_domain_models::sync::SyncResult;

/// Combines several sub-resource results (e.g. Quran's chapters/verses/
/// translations) into the single result a `/sync/{module}` call reports.
pub(super) fn merge_results(resource: &str, results: &[SyncResult]) -> SyncResult {
    SyncResult {
        success: results.iter().all(|r| r.success),
        cancelled: results.iter().any(|r| r.cancelled),
        resource: resource.to_string(),
        records_processed: results.iter().map(|r| r.records_processed).sum(),
        records_inserted: results.iter().map(|r| r.records_inserted).sum(),
        records_updated: results.iter().map(|r| r.records_updated).sum(),
        records_failed: results.iter().map(|r| r.records_failed).sum(),
        errors: results.iter().flat_map(|r| r.errors.clone()).collect(),
        duration_ms: results.iter().map(|r| r.duration_ms).sum(),
    }
}
