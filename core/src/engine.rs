//! The run engine: one sweep over the roster.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Clean the output directory (when enabled)
//!   2. Load open assignments into the ledger     (required if configured)
//!   3. Generate this run's manager assignments   (seeded RNG slot)
//!   4. Per employee, in roster order:
//!        fetch recommendations  (optional, degrades to none)
//!        fetch recent completions (optional, degrades to none)
//!        filter recommendations, resolve completions
//!   5. Reconcile the ledger against all completions
//!   6. Write artifacts, then record history (one transaction)
//!
//! RULES:
//!   - Every time-derived value comes from one RunStamp, except the
//!     per-employee completion snapshot taken by the resolver.
//!   - All randomness flows through the RngBank.
//!   - One employee's failure never stops the sweep.
//!   - Every decision is recorded in the event log.

use crate::{
    artifact,
    assignment::{Assignment, AssignmentGenerator},
    catalog::ContentCatalog,
    clock::{FixedClock, WallClock},
    config::SimConfig,
    error::{SimError, SimResult},
    event::{EventLogEntry, SimEvent},
    ledger::{AssignmentLedger, Reconciliation},
    naming::ArtifactKind,
    recommendation::{filter_recent, Recommendation},
    recommender::HttpRecommender,
    resolver::{CompletionRecord, CompletionResolver},
    rng::{RngBank, RngSlot},
    roster::{Employee, Roster},
    schedule::{iso_utc, recency_range, DateRange, RunStamp},
    source::{degrade, SourceError, SourceResult, Sources},
    store::SimStore,
    types::{EmployeeId, RunId},
};
use std::path::{Path, PathBuf};

/// What one run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: RunId,
    pub seed: u64,
    pub employees: usize,
    pub imported: usize,
    pub generated: usize,
    pub completions: Vec<CompletionRecord>,
    pub reconciliation: Reconciliation,
    pub failed_employees: Vec<EmployeeId>,
    pub artifacts: Vec<PathBuf>,
}

impl RunSummary {
    /// The ledger as it stands after the run.
    pub fn open_assignments(&self) -> &[Assignment] {
        &self.reconciliation.remaining
    }
}

pub struct SimEngine {
    pub run_id: RunId,
    pub config: SimConfig,
    pub rng_bank: RngBank,
    pub catalog: ContentCatalog,
    pub store: SimStore,
    clock: Box<dyn WallClock>,
    sources: Sources,
    seq: u64,
    executed: bool,
}

impl SimEngine {
    pub fn new(
        run_id: RunId,
        seed: u64,
        config: SimConfig,
        catalog: ContentCatalog,
        store: SimStore,
        clock: Box<dyn WallClock>,
        sources: Sources,
    ) -> Self {
        Self {
            run_id,
            config,
            rng_bank: RngBank::new(seed),
            catalog,
            store,
            clock,
            sources,
            seq: 0,
            executed: false,
        }
    }

    /// Build a fully wired engine from configuration.
    /// Call this instead of new() + manual source wiring.
    pub fn build(
        run_id: RunId,
        seed: u64,
        config: SimConfig,
        clock: Box<dyn WallClock>,
    ) -> SimResult<Self> {
        config.validate().map_err(SimError::InvalidConfig)?;

        let catalog = match &config.catalog_path {
            Some(path) => ContentCatalog::load(path)?,
            None => ContentCatalog::builtin(),
        };

        let mut sources = Sources::unconfigured();
        if let Some(rec) = &config.recommender {
            sources.recommendations = Box::new(HttpRecommender::new(rec)?);
        }

        let store = match &config.history_db {
            Some(path) => {
                let store = SimStore::open(path)?;
                store.migrate()?;
                sources.open_assignments = Box::new(store.reopen()?);
                sources.recency = Box::new(store.reopen()?);
                store
            }
            None => {
                log::info!("engine: no history database configured; open-assignment and recency lookups unavailable");
                let store = SimStore::in_memory()?;
                store.migrate()?;
                store
            }
        };

        Ok(Self::new(run_id, seed, config, catalog, store, clock, sources))
    }

    /// Engine for tests: in-memory store, no sources, reference clock.
    pub fn build_test(run_id: RunId, seed: u64) -> SimResult<Self> {
        let store = SimStore::in_memory()?;
        store.migrate()?;
        Ok(Self::new(
            run_id,
            seed,
            SimConfig::default_test(),
            ContentCatalog::builtin(),
            store,
            Box::new(FixedClock::reference()),
            Sources::unconfigured(),
        ))
    }

    pub fn with_sources(mut self, sources: Sources) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn WallClock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    /// Ask the recommendation source for one employee, without running.
    pub fn fetch_recommendations(&self, employee_id: EmployeeId) -> SourceResult<Vec<Recommendation>> {
        self.sources.recommendations.recommendations(employee_id)
    }

    /// Execute the run. An engine runs exactly once.
    pub fn run(&mut self, roster: &Roster) -> SimResult<RunSummary> {
        if self.executed {
            return Err(SimError::RunAlreadyExecuted(self.run_id.clone()));
        }
        self.executed = true;

        let stamp = RunStamp::capture(self.clock.now());
        let seed = self.rng_bank.master_seed();
        self.store.insert_run(
            &self.run_id,
            seed,
            env!("CARGO_PKG_VERSION"),
            &iso_utc(&stamp.captured_at),
        )?;
        self.emit(
            "engine",
            SimEvent::RunInitialized {
                run_id: self.run_id.clone(),
                seed,
                employees: roster.employees.len(),
            },
        )?;
        log::info!(
            "engine: run {} started for {} employee(s), request id {}",
            self.run_id,
            roster.employees.len(),
            stamp.request_id
        );

        let out_dir = self.prepare_output_dir()?;

        // ── Ledger ────────────────────────────────────────────
        let mut ledger = AssignmentLedger::new();
        let imported = self.load_open_assignments(roster, &stamp)?;
        let imported_count = imported.len();
        ledger.bulk_load(imported);
        self.emit("ledger", SimEvent::OpenAssignmentsLoaded { count: imported_count })?;

        let mut rng = self.rng_bank.for_slot(RngSlot::Assignment);
        let generated = AssignmentGenerator::new(&self.catalog).generate(&roster.employees, &stamp, &mut rng);
        ledger.bulk_load(generated.iter().cloned());
        self.emit("ledger", SimEvent::AssignmentsGenerated { count: generated.len() })?;

        // ── Resolution ────────────────────────────────────────
        let range = recency_range(stamp.captured_at, self.config.recency_window_days);
        let mut completions = Vec::new();
        let mut failed = Vec::new();
        for employee in &roster.employees {
            match self.process_employee(employee, &ledger, range) {
                Ok(records) => completions.extend(records),
                Err(e) => {
                    log::error!("engine: employee {} failed: {e}", employee.id);
                    failed.push(employee.id);
                    let event = SimEvent::EmployeeFailed {
                        employee_id: employee.id,
                        reason: e.to_string(),
                    };
                    if let Err(log_err) = self.emit("employee", event) {
                        log::error!("engine: could not record failure of {}: {log_err}", employee.id);
                    }
                }
            }
        }
        log::info!("engine: total completions: {}", completions.len());

        // ── Reconciliation ────────────────────────────────────
        let reconciliation = ledger.remove_completed(&completions);
        log::info!(
            "engine: ledger reconciled, removed {} of {} open assignment(s)",
            reconciliation.removed_count,
            reconciliation.initial_count
        );
        self.emit(
            "ledger",
            SimEvent::LedgerReconciled {
                initial: reconciliation.initial_count,
                removed: reconciliation.removed_count,
            },
        )?;

        // ── Artifacts, then history ───────────────────────────
        // History is committed only after every artifact is on disk.
        let artifacts = match out_dir {
            Some(dir) => self.write_artifacts(&dir, &stamp, &completions, ledger.entries())?,
            None => Vec::new(),
        };
        self.store
            .record_run_history(&self.run_id, &generated, &completions)?;

        self.store.finish_run(
            &self.run_id,
            &iso_utc(&self.clock.now()),
            completions.len(),
        )?;
        self.emit(
            "engine",
            SimEvent::RunCompleted {
                run_id: self.run_id.clone(),
                completions: completions.len(),
                open_assignments: ledger.len(),
            },
        )?;

        Ok(RunSummary {
            run_id: self.run_id.clone(),
            seed,
            employees: roster.employees.len(),
            imported: imported_count,
            generated: generated.len(),
            completions,
            reconciliation,
            failed_employees: failed,
            artifacts,
        })
    }

    fn load_open_assignments(&self, roster: &Roster, stamp: &RunStamp) -> SimResult<Vec<Assignment>> {
        match self.sources.open_assignments.open_assignments(&roster.ids()) {
            Ok(rows) => {
                log::info!("engine: loaded {} open assignment(s)", rows.len());
                Ok(rows
                    .into_iter()
                    .map(|row| Assignment::from_open_row(row, stamp))
                    .collect())
            }
            Err(SourceError::NotConfigured) => {
                log::info!("engine: open-assignment source not configured, starting from an empty ledger");
                Ok(Vec::new())
            }
            Err(reason) => Err(SimError::RequiredSource {
                source_name: "open_assignments",
                reason,
            }),
        }
    }

    fn process_employee(
        &mut self,
        employee: &Employee,
        ledger: &AssignmentLedger,
        range: DateRange,
    ) -> SimResult<Vec<CompletionRecord>> {
        log::debug!(
            "engine: processing employee {} (type {})",
            employee.id,
            employee.edu_type.code()
        );

        let recs = self.sources.recommendations.recommendations(employee.id);
        let recs = self.degrade_logged(recs, "recommendations", employee.id)?;

        let recent = self.sources.recency.recently_completed(employee.id, range);
        let recent = self.degrade_logged(recent, "recency", employee.id)?;

        let suppressed: Vec<_> = recs
            .iter()
            .filter(|r| recent.contains(&r.content_id))
            .map(|r| r.content_id)
            .collect();
        if !suppressed.is_empty() {
            self.emit(
                "employee",
                SimEvent::RecommendationsSuppressed {
                    employee_id: employee.id,
                    content_ids: suppressed,
                },
            )?;
        }
        let recs = filter_recent(recs, &recent);

        let manager = ledger.manager_items(employee.id, &self.catalog);
        let offered = manager.len() + recs.len();
        let records = CompletionResolver::new(&*self.clock).resolve(employee, manager, recs);

        for r in &records {
            self.emit(
                "employee",
                SimEvent::TrainingCompleted {
                    employee_id: r.employee_id,
                    content_id: r.content_id,
                    source: r.source,
                },
            )?;
        }
        self.emit(
            "employee",
            SimEvent::EmployeeResolved {
                employee_id: employee.id,
                edu_type: employee.edu_type.code().to_string(),
                offered,
                completed: records.len(),
            },
        )?;
        if !records.is_empty() {
            log::info!("engine: employee {} completed {} training(s)", employee.id, records.len());
        }
        Ok(records)
    }

    /// Optional sources: record real failures, then fall back to empty.
    fn degrade_logged<T: Default>(
        &mut self,
        result: SourceResult<T>,
        what: &str,
        employee_id: EmployeeId,
    ) -> SimResult<T> {
        if let Err(e) = &result {
            if *e != SourceError::NotConfigured {
                self.emit(
                    "employee",
                    SimEvent::SourceDegraded {
                        employee_id,
                        source: what.to_string(),
                        reason: e.to_string(),
                    },
                )?;
            }
        }
        Ok(degrade(result, what, employee_id))
    }

    fn prepare_output_dir(&self) -> SimResult<Option<PathBuf>> {
        let Some(dir) = &self.config.output_dir else {
            return Ok(None);
        };
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)?;
        if self.config.clean_output_dir {
            artifact::clean_output_dir(&dir)?;
        }
        Ok(Some(dir))
    }

    fn write_artifacts(
        &mut self,
        dir: &Path,
        stamp: &RunStamp,
        completions: &[CompletionRecord],
        open: &[Assignment],
    ) -> SimResult<Vec<PathBuf>> {
        let tag = self
            .rng_bank
            .for_slot(RngSlot::FileTag)
            .alnum_tag(self.config.file_tag_len);
        let mut written = Vec::new();

        if completions.is_empty() {
            log::info!("engine: no completions to write");
        } else {
            let path = dir.join(ArtifactKind::Completions.file_name(stamp, &tag));
            artifact::write_completion_file(&path, completions)?;
            self.record_artifact(ArtifactKind::Completions, &path, completions.len())?;
            written.push(path);
        }

        let path = dir.join(ArtifactKind::OpenAssignments.file_name(stamp, &tag));
        artifact::write_ledger_file(&path, open)?;
        self.record_artifact(ArtifactKind::OpenAssignments, &path, open.len())?;
        written.push(path);

        if let Some(template) = self.config.user_completion_template.clone() {
            let dest = dir.join(ArtifactKind::UserCompletion.file_name(stamp, &tag));
            if let Some(path) = artifact::copy_user_completion_template(&template, &dest)? {
                self.record_artifact(ArtifactKind::UserCompletion, &path, 0)?;
                written.push(path);
            }
        }
        Ok(written)
    }

    fn record_artifact(&mut self, kind: ArtifactKind, path: &Path, rows: usize) -> SimResult<()> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        log::info!("engine: generated {file_name}");
        self.emit(
            "artifact",
            SimEvent::ArtifactWritten {
                kind: kind.name().to_string(),
                file_name,
                rows,
            },
        )
    }

    fn emit(&mut self, stage: &str, event: SimEvent) -> SimResult<()> {
        let entry = EventLogEntry {
            id: None,
            run_id: self.run_id.clone(),
            seq: self.seq,
            stage: stage.to_string(),
            event_type: event.type_name().to_string(),
            payload: serde_json::to_string(&event)?,
        };
        self.store.append_event(&entry)?;
        self.seq += 1;
        Ok(())
    }

    /// Event payloads for this run, in emission order.
    pub fn event_payloads(&self) -> SimResult<Vec<String>> {
        Ok(self
            .store
            .events_for_run(&self.run_id)?
            .into_iter()
            .map(|e| e.payload)
            .collect())
    }
}
