use attendance_core::{
    import_document, AttendanceStore, ExportDocument, FixedClock, MemoryKvRepository, NewSubject,
};
use chrono::NaiveDate;

fn store_on(date: NaiveDate) -> AttendanceStore<MemoryKvRepository, FixedClock> {
    AttendanceStore::open_with_clock(MemoryKvRepository::new(), FixedClock::on(date))
}

#[test]
fn export_then_import_into_empty_store_preserves_counts() {
    let first_day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut source = store_on(first_day);
    let math = source
        .add_subject(NewSubject::new("Math", [1, 3, 5], 2).with_color("#3B82F6"))
        .unwrap();
    let art = source.add_subject(NewSubject::new("Art", [2], 1)).unwrap();
    source.add_subject(NewSubject::new("Idle", [6], 1)).unwrap();
    source.mark_attendance(&math, 1, true, None);
    source.mark_attendance(&math, 2, false, None);
    source.mark_attendance(&math, 1, true, NaiveDate::from_ymd_opt(2024, 1, 3));
    source.mark_attendance(&art, 1, false, None);

    let exported = ExportDocument::from_store(&source).to_json_pretty().unwrap();

    let import_day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let mut target = store_on(import_day);
    let report = import_document(&mut target, &exported).unwrap();
    assert_eq!(report.created_subjects.len(), 3);
    assert!(report.rejected.is_empty());

    let before = source.per_subject_stats();
    let after = target.per_subject_stats();
    assert_eq!(before.len(), after.len());
    for (original, restored) in before.iter().zip(after.iter()) {
        assert_eq!(original.subject_name, restored.subject_name);
        assert_eq!(original.total_classes, restored.total_classes);
        assert_eq!(original.present_classes, restored.present_classes);
        assert_eq!(original.attendance_percentage, restored.attendance_percentage);
        assert_eq!(original.schedule, restored.schedule);
        assert_eq!(original.color, restored.color);
    }
    assert_eq!(source.overall_stats(), target.overall_stats());
    assert!(target
        .records()
        .iter()
        .all(|record| record.date == import_day));
}
