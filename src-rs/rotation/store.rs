use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use rand::seq::IndexedRandom;
use rusqlite::{params, Connection, Row, TransactionBehavior};
use tracing::{debug, error, info, warn};

use super::error::{is_constraint_violation, Result, RotationError};
use super::schema::{CURRENT_CYCLE_KEY, SCHEMA};
use super::types::{CycleStats, Item, UsageRecord};

/// Persisted no-repeat rotation over a fixed pool of messages.
///
/// One instance owns one SQLite connection and is shared by reference across
/// request handlers. Mutating operations hold the connection lock and run in
/// an `IMMEDIATE` transaction, so concurrent draws (in this process or from
/// another store opened on the same file) never observe the same exhausted
/// cycle or pick the same item twice.
pub struct RotationStore {
    conn: Mutex<Connection>,
}

impl RotationStore {
    /// Open (or create) the store at `path`, creating the parent directory.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON; PRAGMA busy_timeout=5000;")?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// A panic while holding the lock drops any open transaction, which rolls
    /// it back, so the connection is still consistent for the next caller.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| {
            warn!("recovering store connection after a panicked holder");
            PoisonError::into_inner(poisoned)
        })
    }

    /// Bulk-load the pool. A no-op when items already exist; otherwise every
    /// non-empty string is inserted in one transaction. Returns the number of
    /// items inserted.
    pub fn load<S: AsRef<str>>(&self, items: &[S]) -> Result<usize> {
        let mut conn = self.conn();
        insert_pool(&mut conn, items)
            .map_err(|err| RotationError::load(format!("storage unavailable: {}", err)))
    }

    /// Serve one item not yet used in the current cycle, rolling the cycle
    /// over first when every item has been used.
    pub fn draw(&self) -> Result<Item> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut cycle = read_cycle(&tx)?;
        let total = count_items(&tx)?;
        if total == 0 {
            return Err(RotationError::EmptyPool);
        }

        let used = count_usage(&tx, cycle)?;
        let rolled_over = CycleStats::new(cycle, total, used).is_exhausted();
        if rolled_over {
            cycle += 1;
            write_cycle(&tx, cycle)?;
        }

        let eligible = eligible_ids(&tx, cycle)?;
        let item_id = *eligible
            .choose(&mut rand::rng())
            .ok_or(RotationError::EmptyPool)?;

        let inserted = tx.execute(
            "INSERT INTO item_usage (item_id, cycle, used_at) VALUES (?1, ?2, ?3)",
            params![item_id, cycle, Utc::now()],
        );
        match inserted {
            Ok(_) => {}
            Err(err) if is_constraint_violation(&err) => {
                error!(item_id, cycle, "usage already recorded for item in this cycle");
                return Err(RotationError::DuplicateUsage { item_id, cycle });
            }
            Err(err) => return Err(err.into()),
        }

        let item = tx.query_row(
            "SELECT id, content, created_at FROM items WHERE id = ?1",
            [item_id],
            map_item,
        )?;
        tx.commit()?;

        if rolled_over {
            info!(cycle, total, "all messages used, started new cycle");
        }
        debug!(item_id, cycle, remaining = eligible.len() - 1, "drew message");
        Ok(item)
    }

    /// Snapshot of the current cycle. Purely informational.
    pub fn stats(&self) -> Result<CycleStats> {
        let conn = self.conn();
        let cycle = read_cycle(&conn)?;
        stats_at(&conn, cycle)
    }

    /// Usage figures for any cycle, including past ones.
    pub fn stats_for_cycle(&self, cycle: i64) -> Result<CycleStats> {
        let conn = self.conn();
        stats_at(&conn, cycle)
    }

    /// Start a new cycle regardless of how much of the current one is used.
    /// Prior usage records are kept. Returns the new cycle number.
    pub fn force_new_cycle(&self) -> Result<i64> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let cycle = read_cycle(&tx)? + 1;
        write_cycle(&tx, cycle)?;
        tx.commit()?;

        info!(cycle, "cycle manually reset");
        Ok(cycle)
    }

    pub fn current_cycle(&self) -> Result<i64> {
        let conn = self.conn();
        read_cycle(&conn)
    }

    /// All item contents ordered by id.
    pub fn contents(&self) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT content FROM items ORDER BY id")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let contents = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(contents)
    }

    /// Usage records of one cycle, oldest first.
    pub fn usage_history(&self, cycle: i64) -> Result<Vec<UsageRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT item_id, cycle, used_at FROM item_usage WHERE cycle = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([cycle], |row| {
            Ok(UsageRecord {
                item_id: row.get(0)?,
                cycle: row.get(1)?,
                used_at: row.get(2)?,
            })
        })?;
        let records = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}

fn insert_pool<S: AsRef<str>>(conn: &mut Connection, items: &[S]) -> rusqlite::Result<usize> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let existing: i64 = tx.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
    if existing > 0 {
        info!(existing, "messages already loaded");
        return Ok(0);
    }

    let now = Utc::now();
    let mut inserted = 0;
    {
        let mut stmt = tx.prepare("INSERT INTO items (content, created_at) VALUES (?1, ?2)")?;
        for item in items {
            let content: &str = item.as_ref();
            if content.is_empty() {
                continue;
            }
            stmt.execute(params![content, now])?;
            inserted += 1;
        }
    }
    tx.commit()?;

    info!(inserted, "loaded messages into database");
    Ok(inserted)
}

fn map_item(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        content: row.get(1)?,
        created_at: row.get(2)?,
    })
}

fn read_cycle(conn: &Connection) -> Result<i64> {
    let cycle = conn.query_row(
        "SELECT value FROM rotation_metadata WHERE key = ?1",
        [CURRENT_CYCLE_KEY],
        |row| row.get(0),
    )?;
    Ok(cycle)
}

fn write_cycle(conn: &Connection, cycle: i64) -> Result<()> {
    let updated = conn.execute(
        "UPDATE rotation_metadata SET value = ?2, updated_at = ?3 WHERE key = ?1",
        params![CURRENT_CYCLE_KEY, cycle, Utc::now()],
    )?;
    if updated != 1 {
        return Err(rusqlite::Error::QueryReturnedNoRows.into());
    }
    Ok(())
}

fn count_items(conn: &Connection) -> Result<i64> {
    let total = conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
    Ok(total)
}

fn count_usage(conn: &Connection, cycle: i64) -> Result<i64> {
    let used = conn.query_row(
        "SELECT COUNT(*) FROM item_usage WHERE cycle = ?1",
        [cycle],
        |row| row.get(0),
    )?;
    Ok(used)
}

fn stats_at(conn: &Connection, cycle: i64) -> Result<CycleStats> {
    let total = count_items(conn)?;
    let used = count_usage(conn, cycle)?;
    Ok(CycleStats::new(cycle, total, used))
}

/// Ids with no usage record in `cycle`, computed fresh from the ledger.
fn eligible_ids(conn: &Connection, cycle: i64) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT id FROM items
         WHERE id NOT IN (SELECT item_id FROM item_usage WHERE cycle = ?1)
         ORDER BY id",
    )?;
    let rows = stmt.query_map([cycle], |row| row.get::<_, i64>(0))?;
    let ids = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ids)
}
