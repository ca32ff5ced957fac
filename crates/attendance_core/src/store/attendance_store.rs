//! Attendance store: owned collections plus mutation/query operations.
//!
//! # Responsibility
//! - Load subjects, records and settings through a `PersistenceAdapter`.
//! - Apply subject/attendance mutations and save the touched collection.
//! - Answer read-only queries used by UI collaborators.
//!
//! # Invariants
//! - At most one record per `(subject_id, date, lecture_number)`.
//! - No record references a removed subject.
//! - A failed save is logged; memory keeps the mutation.
//! - Stored data that did not load is never discarded by a later save.

use crate::clock::{Clock, SystemClock};
use crate::model::attendance::AttendanceRecord;
use crate::model::calendar::weekday_of;
use crate::model::settings::{AppSettings, SettingsError, SettingsPatch};
use crate::model::subject::{NewSubject, Subject, SubjectId, SubjectPatch, SubjectValidationError};
use crate::repo::kv_repo::{PersistenceAdapter, StorageKey};
use crate::stats::aggregator::{self, OverallStats, SubjectStats};
use crate::store::reconcile::{cascade_remove_records, clamp_lecture_count, reconcile_lecture_count};
use chrono::NaiveDate;
use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Outcome of adjusting one day's lecture count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LectureCountChange {
    /// Requested count after clamping to `0..=10`.
    pub applied_count: u32,
    /// Lecture numbers whose records were removed, ascending.
    pub removed_lectures: Vec<u32>,
}

impl LectureCountChange {
    /// A count of zero marks the day as cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.applied_count == 0
    }
}

/// Authoritative holder of subjects and attendance records.
pub struct AttendanceStore<P: PersistenceAdapter, C: Clock = SystemClock> {
    adapter: P,
    clock: C,
    subjects: Vec<Subject>,
    records: Vec<AttendanceRecord>,
    settings: AppSettings,
    /// Stored elements that did not decode; written back unchanged on save.
    held_subjects: Vec<Value>,
    held_records: Vec<Value>,
    /// Collection keys whose stored value could not be read at all.
    read_only: HashSet<StorageKey>,
}

impl<P: PersistenceAdapter> AttendanceStore<P, SystemClock> {
    /// Loads all collections from `adapter` using the system clock.
    pub fn open(adapter: P) -> Self {
        Self::open_with_clock(adapter, SystemClock)
    }
}

impl<P: PersistenceAdapter, C: Clock> AttendanceStore<P, C> {
    /// Loads all collections from `adapter`.
    ///
    /// Absent keys yield empty collections/default settings. Collection
    /// elements that fail to decode are held back and saved again as they
    /// were. A collection key that cannot be read as a list is left empty
    /// in memory and never overwritten by this store. Records whose subject
    /// is gone are dropped; records whose subject was held back are held
    /// back with it.
    pub fn open_with_clock(adapter: P, clock: C) -> Self {
        let subjects = load_collection::<Subject>(&adapter, StorageKey::Subjects);
        let records = load_collection::<AttendanceRecord>(&adapter, StorageKey::Attendance);
        let settings = load_settings(&adapter);

        let mut read_only = HashSet::new();
        if subjects.unreadable {
            read_only.insert(StorageKey::Subjects);
        }
        if records.unreadable {
            read_only.insert(StorageKey::Attendance);
        }

        let owners_unknown = subjects.unreadable;
        let held_owner_ids = subjects
            .held
            .iter()
            .filter_map(|element| element.get("id").and_then(Value::as_str))
            .map(str::to_string)
            .collect::<HashSet<_>>();
        let live = subjects
            .items
            .iter()
            .map(|subject| subject.id.clone())
            .collect::<HashSet<_>>();

        let mut held_records = records.held;
        let mut kept = Vec::with_capacity(records.items.len());
        let mut orphaned = 0usize;
        for record in records.items {
            if live.contains(&record.subject_id) {
                kept.push(record);
            } else if owners_unknown || held_owner_ids.contains(&record.subject_id) {
                match serde_json::to_value(&record) {
                    Ok(element) => held_records.push(element),
                    Err(_) => orphaned += 1,
                }
            } else {
                orphaned += 1;
            }
        }
        if orphaned > 0 {
            warn!("event=store_open module=store status=repaired orphaned_records={orphaned}");
        }

        info!(
            "event=store_open module=store status=ok subjects={} records={} held_subjects={} held_records={}",
            subjects.items.len(),
            kept.len(),
            subjects.held.len(),
            held_records.len()
        );

        Self {
            adapter,
            clock,
            subjects: subjects.items,
            records: kept,
            settings,
            held_subjects: subjects.held,
            held_records,
            read_only,
        }
    }

    /// Persistence adapter backing this store.
    pub fn adapter(&self) -> &P {
        &self.adapter
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Current calendar day according to the store clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn subject(&self, subject_id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|subject| subject.id == subject_id)
    }

    pub fn subject_by_name(&self, name: &str) -> Option<&Subject> {
        let name = name.trim();
        self.subjects.iter().find(|subject| subject.name == name)
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Number of stored subject and record elements kept aside on load.
    pub fn held_back(&self) -> (usize, usize) {
        (self.held_subjects.len(), self.held_records.len())
    }

    /// Whether saves to `key` are suppressed because its stored value was
    /// unreadable on load.
    pub fn is_read_only(&self, key: StorageKey) -> bool {
        self.read_only.contains(&key)
    }

    /// Creates a subject with a fresh id and timestamp.
    ///
    /// Names need not be unique. Invalid input is rejected before mutation.
    pub fn add_subject(&mut self, input: NewSubject) -> Result<SubjectId, SubjectValidationError> {
        let subject = Subject::create(input, self.clock.now())?;
        let subject_id = subject.id.clone();
        self.subjects.push(subject);
        debug!("event=subject_add module=store status=ok subject_id={subject_id}");
        self.persist_subjects();
        Ok(subject_id)
    }

    /// Removes a subject and every record it owns.
    ///
    /// Returns `false` (and does nothing) when the subject does not exist.
    pub fn remove_subject(&mut self, subject_id: &str) -> bool {
        let Some(index) = self
            .subjects
            .iter()
            .position(|subject| subject.id == subject_id)
        else {
            return false;
        };

        self.subjects.remove(index);
        let removed_records = cascade_remove_records(&mut self.records, subject_id);
        debug!(
            "event=subject_remove module=store status=ok subject_id={subject_id} removed_records={removed_records}"
        );
        self.persist_subjects();
        if removed_records > 0 {
            self.persist_records();
        }
        true
    }

    /// Merges `patch` into an existing subject.
    ///
    /// Returns `Ok(false)` when the subject does not exist. An invalid merge
    /// leaves the subject unchanged; an empty patch saves nothing.
    pub fn edit_subject(
        &mut self,
        subject_id: &str,
        patch: &SubjectPatch,
    ) -> Result<bool, SubjectValidationError> {
        let Some(subject) = self
            .subjects
            .iter_mut()
            .find(|subject| subject.id == subject_id)
        else {
            return Ok(false);
        };
        if patch.is_empty() {
            return Ok(true);
        }

        *subject = subject.merged(patch)?;
        debug!("event=subject_edit module=store status=ok subject_id={subject_id}");
        self.persist_subjects();
        Ok(true)
    }

    /// Sets the outcome of one lecture slot, creating the record if needed.
    ///
    /// `date` defaults to the clock's current day. Neither the subject nor
    /// the lecture number is checked against the schedule.
    pub fn mark_attendance(
        &mut self,
        subject_id: &str,
        lecture_number: u32,
        present: bool,
        date: Option<NaiveDate>,
    ) {
        let date = date.unwrap_or_else(|| self.clock.today());
        match self
            .records
            .iter()
            .position(|record| record.is_slot(subject_id, date, lecture_number))
        {
            Some(index) => self.records[index].present = present,
            None => {
                let record =
                    AttendanceRecord::new(subject_id, date, lecture_number, present, self.clock.now());
                self.records.push(record);
            }
        }
        debug!(
            "event=attendance_mark module=store status=ok subject_id={subject_id} date={date} lecture={lecture_number} present={present}"
        );
        self.persist_records();
    }

    /// Deletes the record of one lecture slot. Returns whether one existed.
    pub fn remove_attendance(
        &mut self,
        subject_id: &str,
        lecture_number: u32,
        date: Option<NaiveDate>,
    ) -> bool {
        let date = date.unwrap_or_else(|| self.clock.today());
        let before = self.records.len();
        self.records
            .retain(|record| !record.is_slot(subject_id, date, lecture_number));
        if self.records.len() == before {
            return false;
        }
        debug!(
            "event=attendance_remove module=store status=ok subject_id={subject_id} date={date} lecture={lecture_number}"
        );
        self.persist_records();
        true
    }

    /// Adjusts the number of lectures held by a subject on one day.
    ///
    /// The count is clamped to `0..=10`. Records for lecture numbers above the
    /// new count are removed; `0` cancels the day and removes all of them.
    pub fn set_lecture_count(
        &mut self,
        subject_id: &str,
        date: Option<NaiveDate>,
        count: i64,
    ) -> LectureCountChange {
        let date = date.unwrap_or_else(|| self.clock.today());
        let applied_count = clamp_lecture_count(count);
        let stale = reconcile_lecture_count(
            self.records
                .iter()
                .filter(|record| record.is_on(subject_id, date)),
            applied_count,
        );

        let removed_lectures = stale
            .into_iter()
            .filter(|lecture_number| self.remove_attendance(subject_id, *lecture_number, Some(date)))
            .collect::<Vec<_>>();

        LectureCountChange {
            applied_count,
            removed_lectures,
        }
    }

    /// Appends reconstructed history for a subject on `date`.
    ///
    /// Lecture numbers continue after the highest one already recorded for
    /// that day, present slots first. Stops early if lecture numbers would
    /// overflow. Returns the number of records created.
    pub fn append_history(
        &mut self,
        subject_id: &str,
        date: NaiveDate,
        present: u32,
        absent: u32,
    ) -> usize {
        let mut lecture_number = self.highest_lecture(subject_id, date);
        let created_at = self.clock.now();
        let outcomes = std::iter::repeat(true)
            .take(present as usize)
            .chain(std::iter::repeat(false).take(absent as usize));

        let mut created = 0;
        for outcome in outcomes {
            let Some(next) = lecture_number.checked_add(1) else {
                warn!(
                    "event=history_append module=store status=error subject_id={subject_id} date={date} error_code=lecture_number_overflow"
                );
                break;
            };
            lecture_number = next;
            self.records.push(AttendanceRecord::new(
                subject_id,
                date,
                lecture_number,
                outcome,
                created_at,
            ));
            created += 1;
        }

        if created > 0 {
            debug!(
                "event=history_append module=store status=ok subject_id={subject_id} date={date} records={created}"
            );
            self.persist_records();
        }
        created
    }

    /// Subjects with lectures on `weekday` (`0 = Sunday`), in collection order.
    pub fn subjects_scheduled_on(&self, weekday: u8) -> Vec<&Subject> {
        self.subjects
            .iter()
            .filter(|subject| subject.is_scheduled_on(weekday))
            .collect()
    }

    pub fn subjects_scheduled_on_date(&self, date: NaiveDate) -> Vec<&Subject> {
        self.subjects_scheduled_on(weekday_of(date))
    }

    pub fn todays_subjects(&self) -> Vec<&Subject> {
        self.subjects_scheduled_on_date(self.clock.today())
    }

    /// Records of one subject on one day.
    pub fn records_for(&self, subject_id: &str, date: NaiveDate) -> Vec<&AttendanceRecord> {
        self.records
            .iter()
            .filter(|record| record.is_on(subject_id, date))
            .collect()
    }

    /// Present/absent outcome of one slot, `None` when unrecorded.
    pub fn attendance_value(
        &self,
        subject_id: &str,
        date: NaiveDate,
        lecture_number: u32,
    ) -> Option<bool> {
        self.records
            .iter()
            .find(|record| record.is_slot(subject_id, date, lecture_number))
            .map(|record| record.present)
    }

    /// Lecture count to show for a day: the subject default, raised to the
    /// highest lecture number already recorded. `None` for unknown subjects.
    pub fn lectures_for_day(&self, subject_id: &str, date: NaiveDate) -> Option<u32> {
        let subject = self.subject(subject_id)?;
        Some(subject.lectures_per_day.max(self.highest_lecture(subject_id, date)))
    }

    /// Present slots numbered at most `lecture_count` on one day.
    pub fn present_count_for_day(
        &self,
        subject_id: &str,
        date: NaiveDate,
        lecture_count: u32,
    ) -> u32 {
        let count = self
            .records
            .iter()
            .filter(|record| {
                record.is_on(subject_id, date)
                    && record.present
                    && record.lecture_number <= lecture_count
            })
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    pub fn per_subject_stats(&self) -> Vec<SubjectStats> {
        aggregator::per_subject_stats(&self.subjects, &self.records)
    }

    pub fn overall_stats(&self) -> OverallStats {
        aggregator::overall_stats(&self.subjects, &self.records)
    }

    /// Applies a validated settings patch and saves it.
    pub fn update_settings(&mut self, patch: &SettingsPatch) -> Result<&AppSettings, SettingsError> {
        self.settings = self.settings.merged(patch)?;
        match serde_json::to_value(&self.settings) {
            Ok(value) => self.save(StorageKey::Settings, &value),
            Err(err) => error!(
                "event=store_save module=store status=error key={} error_code=encode_failed error={err}",
                StorageKey::Settings
            ),
        }
        Ok(&self.settings)
    }

    fn highest_lecture(&self, subject_id: &str, date: NaiveDate) -> u32 {
        self.records
            .iter()
            .filter(|record| record.is_on(subject_id, date))
            .map(|record| record.lecture_number)
            .max()
            .unwrap_or(0)
    }

    fn persist_subjects(&self) {
        self.persist_collection(StorageKey::Subjects, &self.subjects, &self.held_subjects);
    }

    fn persist_records(&self) {
        self.persist_collection(StorageKey::Attendance, &self.records, &self.held_records);
    }

    fn persist_collection<T: Serialize>(&self, key: StorageKey, items: &[T], held: &[Value]) {
        let mut elements = Vec::with_capacity(items.len() + held.len());
        for item in items {
            match serde_json::to_value(item) {
                Ok(element) => elements.push(element),
                Err(err) => {
                    error!(
                        "event=store_save module=store status=error key={key} error_code=encode_failed error={err}"
                    );
                    return;
                }
            }
        }
        elements.extend(held.iter().cloned());
        self.save(key, &Value::Array(elements));
    }

    fn save(&self, key: StorageKey, value: &Value) {
        if self.read_only.contains(&key) {
            warn!("event=store_save module=store status=skipped key={key} error_code=unreadable_on_load");
            return;
        }
        if let Err(err) = self.adapter.save(key, value) {
            error!(
                "event=store_save module=store status=error key={key} error_code=save_failed error={err}"
            );
        }
    }
}

/// Decoded elements of one stored collection.
struct LoadedCollection<T> {
    items: Vec<T>,
    /// Elements that failed to decode, in stored order.
    held: Vec<Value>,
    /// The stored value could not be read as a list.
    unreadable: bool,
}

impl<T> LoadedCollection<T> {
    fn empty(unreadable: bool) -> Self {
        Self {
            items: Vec::new(),
            held: Vec::new(),
            unreadable,
        }
    }
}

fn load_collection<T: DeserializeOwned>(
    adapter: &impl PersistenceAdapter,
    key: StorageKey,
) -> LoadedCollection<T> {
    let elements = match adapter.load(key) {
        Ok(Some(Value::Array(elements))) => elements,
        Ok(Some(_)) => {
            error!("event=store_load module=store status=error key={key} error_code=not_a_list");
            return LoadedCollection::empty(true);
        }
        Ok(None) => return LoadedCollection::empty(false),
        Err(err) => {
            error!(
                "event=store_load module=store status=error key={key} error_code=load_failed error={err}"
            );
            return LoadedCollection::empty(true);
        }
    };

    let mut loaded = LoadedCollection::empty(false);
    for (index, element) in elements.into_iter().enumerate() {
        match T::deserialize(&element) {
            Ok(item) => loaded.items.push(item),
            Err(err) => {
                warn!(
                    "event=store_load module=store status=partial key={key} index={index} error_code=decode_failed error={err}"
                );
                loaded.held.push(element);
            }
        }
    }
    loaded
}

fn load_settings(adapter: &impl PersistenceAdapter) -> AppSettings {
    let key = StorageKey::Settings;
    let loaded = match adapter.load(key) {
        Ok(Some(value)) => serde_json::from_value::<AppSettings>(value)
            .map_err(|err| err.to_string())
            .and_then(|settings| {
                settings.validate().map_err(|err| err.to_string())?;
                Ok(settings)
            }),
        Ok(None) => return AppSettings::default(),
        Err(err) => Err(err.to_string()),
    };

    loaded.unwrap_or_else(|err| {
        error!("event=store_load module=store status=error key={key} error_code=settings_invalid error={err}");
        AppSettings::default()
    })
}
