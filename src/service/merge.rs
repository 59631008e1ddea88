//! Player identity merge.
//!
//! Reassigns every reference from a duplicate player record to a canonical
//! one, table by table, then deletes the duplicate. Tables are processed in
//! a fixed order and a failure in one table never stops the rest; the report
//! says exactly which tables migrated so a partial merge is diagnosable and
//! safe to retry.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::models::PlayerId;
use crate::storage::{LeagueStore, StorageError, Table};

use super::{MergeReport, MigrationOutcome, ServiceError, TableMigration};

/// How a table's player references migrate.
#[derive(Debug, Clone, Copy)]
enum MergeStrategy {
    /// Plain foreign-key columns: unconditional update from source to
    /// target. Columns are dot-paths into the row.
    Simple { columns: &'static [&'static str] },

    /// At most one row per (key columns, player), with a surrogate `id`:
    /// keep the target's row when both exist (delete the source row),
    /// otherwise repoint the source row.
    UniqueComposite {
        player_column: &'static str,
        key_columns: &'static [&'static str],
    },

    /// Same uniqueness, but the (key columns, player) tuple is the primary
    /// key with no surrogate id: migration is delete + conditional insert.
    CompositePk {
        player_column: &'static str,
        key_columns: &'static [&'static str],
    },
}

struct MergeStep {
    table: Table,
    strategy: MergeStrategy,
}

/// The fixed migration order. Tournament membership first, then match-level
/// references, then league rollups, so a partial failure leaves the most
/// user-visible tables for a retry rather than half-moved.
const MERGE_STEPS: &[MergeStep] = &[
    MergeStep {
        table: Table::TournamentPlayers,
        strategy: MergeStrategy::CompositePk {
            player_column: "player_id",
            key_columns: &["tournament_id"],
        },
    },
    MergeStep {
        table: Table::GroupPlayers,
        strategy: MergeStrategy::CompositePk {
            player_column: "player_id",
            key_columns: &["group_id"],
        },
    },
    MergeStep {
        table: Table::Matches,
        strategy: MergeStrategy::Simple {
            columns: &["player1.id", "player2.id", "result.winner"],
        },
    },
    MergeStep {
        table: Table::Legs,
        strategy: MergeStrategy::Simple {
            columns: &["player1_id", "player2_id", "winner_id"],
        },
    },
    MergeStep {
        table: Table::DartThrows,
        strategy: MergeStrategy::Simple {
            columns: &["player_id"],
        },
    },
    MergeStep {
        table: Table::MatchPlayerStats,
        strategy: MergeStrategy::Simple {
            columns: &["player_id"],
        },
    },
    MergeStep {
        table: Table::GroupStandings,
        strategy: MergeStrategy::Simple {
            columns: &["player_id"],
        },
    },
    MergeStep {
        table: Table::TournamentStats,
        strategy: MergeStrategy::Simple {
            columns: &["player_id"],
        },
    },
    MergeStep {
        table: Table::LeagueMembers,
        strategy: MergeStrategy::UniqueComposite {
            player_column: "player_id",
            key_columns: &["league_id"],
        },
    },
    MergeStep {
        table: Table::LeagueTournamentResults,
        strategy: MergeStrategy::UniqueComposite {
            player_column: "player_id",
            key_columns: &["league_id", "tournament_id"],
        },
    },
    MergeStep {
        table: Table::LeagueLeaderboard,
        // No surrogate id in this table; (league, player) is the key.
        strategy: MergeStrategy::CompositePk {
            player_column: "player_id",
            key_columns: &["league_id"],
        },
    },
];

pub struct PlayerMergeService {
    store: Arc<dyn LeagueStore>,
}

impl PlayerMergeService {
    pub fn new(store: Arc<dyn LeagueStore>) -> Self {
        Self { store }
    }

    /// Merge `source` into `target`.
    ///
    /// Not transactional across tables: each table migrates independently
    /// and failures are collected rather than raised. The source player row
    /// is deleted only when every table migrated. Re-running after the
    /// source row is gone short-circuits with an already-merged report.
    pub fn merge(
        &self,
        source: &PlayerId,
        target: &PlayerId,
    ) -> Result<MergeReport, ServiceError> {
        if source == target {
            return Err(ServiceError::SelfMerge(source.clone()));
        }

        if self.store.read_player(source)?.is_none() {
            info!(source = %source, "source player already gone, merge short-circuits");
            return Ok(MergeReport::already_merged(source.clone(), target.clone()));
        }
        self.store
            .read_player(target)?
            .ok_or_else(|| ServiceError::not_found("player", target))?;

        let mut tables = Vec::with_capacity(MERGE_STEPS.len());
        for step in MERGE_STEPS {
            let outcome = match self.migrate_table(step, source, target) {
                Ok(rows) => MigrationOutcome::Migrated { rows },
                Err(e) => {
                    error!(
                        table = %step.table,
                        error = %e,
                        "reference migration failed, continuing with remaining tables"
                    );
                    MigrationOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            tables.push(TableMigration {
                table: step.table.name().to_string(),
                outcome,
            });
        }

        let all_migrated = tables.iter().all(TableMigration::succeeded);
        let mut source_deleted = false;
        if all_migrated {
            match self.store.delete_player(source) {
                Ok(_) => source_deleted = true,
                Err(e) => {
                    error!(source = %source, error = %e, "failed to delete source player");
                    tables.push(TableMigration {
                        table: Table::Players.name().to_string(),
                        outcome: MigrationOutcome::Failed {
                            error: e.to_string(),
                        },
                    });
                }
            }
        } else {
            warn!(
                source = %source,
                target = %target,
                "merge left source player in place due to table failures"
            );
        }

        info!(
            source = %source,
            target = %target,
            source_deleted,
            "player merge finished"
        );
        Ok(MergeReport {
            source_id: source.clone(),
            target_id: target.clone(),
            already_merged: false,
            tables,
            source_deleted,
        })
    }

    fn migrate_table(
        &self,
        step: &MergeStep,
        source: &PlayerId,
        target: &PlayerId,
    ) -> Result<usize, StorageError> {
        match step.strategy {
            MergeStrategy::Simple { columns } => {
                let mut total = 0;
                for column in columns {
                    total += self
                        .store
                        .update_column_where(step.table, column, source, target)?;
                }
                Ok(total)
            }
            MergeStrategy::UniqueComposite {
                player_column,
                key_columns,
            } => {
                let rows = self
                    .store
                    .list_referencing_rows(step.table, player_column, source)?;
                let target_value = json!(target.as_str());
                let mut moved = 0;
                for row in rows {
                    let row_id = row
                        .get("id")
                        .and_then(Value::as_str)
                        .ok_or_else(|| {
                            StorageError::InvalidPath(format!(
                                "row without id in {}",
                                step.table
                            ))
                        })?
                        .to_string();
                    // The existence check happens before any mutation of this
                    // row, so a crash can never leave both sides conflicting.
                    if self.target_row_exists(step.table, key_columns, player_column, &row, target)? {
                        self.store.delete_row(step.table, &row_id)?;
                    } else {
                        self.store.update_row_column(
                            step.table,
                            &row_id,
                            player_column,
                            &target_value,
                        )?;
                    }
                    moved += 1;
                }
                Ok(moved)
            }
            MergeStrategy::CompositePk {
                player_column,
                key_columns,
            } => {
                let rows = self
                    .store
                    .list_referencing_rows(step.table, player_column, source)?;
                let mut moved = 0;
                for row in rows {
                    let exists = self.target_row_exists(
                        step.table,
                        key_columns,
                        player_column,
                        &row,
                        target,
                    )?;

                    let source_value = json!(source.as_str());
                    let key_values: Vec<Value> = key_columns
                        .iter()
                        .map(|k| row.get(*k).cloned().unwrap_or(Value::Null))
                        .collect();
                    let mut source_filter: Vec<(&str, &Value)> = Vec::new();
                    for (column, value) in key_columns.iter().zip(key_values.iter()) {
                        source_filter.push((*column, value));
                    }
                    source_filter.push((player_column, &source_value));
                    self.store.delete_rows_where(step.table, &source_filter)?;

                    if !exists {
                        let mut migrated = row.clone();
                        if let Some(object) = migrated.as_object_mut() {
                            object.insert(
                                player_column.to_string(),
                                json!(target.as_str()),
                            );
                        }
                        self.store.insert_row(step.table, &migrated)?;
                    }
                    moved += 1;
                }
                Ok(moved)
            }
        }
    }

    fn target_row_exists(
        &self,
        table: Table,
        key_columns: &[&str],
        player_column: &str,
        source_row: &Value,
        target: &PlayerId,
    ) -> Result<bool, StorageError> {
        let target_value = json!(target.as_str());
        let key_values: Vec<Value> = key_columns
            .iter()
            .map(|k| source_row.get(*k).cloned().unwrap_or(Value::Null))
            .collect();
        let mut filter: Vec<(&str, &Value)> = Vec::new();
        for (column, value) in key_columns.iter().zip(key_values.iter()) {
            filter.push((*column, value));
        }
        filter.push((player_column, &target_value));
        self.store.reference_row_exists(table, &filter)
    }
}
