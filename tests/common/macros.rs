/// Asserts that a warning list holds exactly `$count` warnings of one kind.
#[macro_export]
macro_rules! assert_warnings {
    ($warnings:expr, $pattern:pat, $count:expr) => {
        let found = $warnings
            .iter()
            .filter(|w| matches!(w, $pattern))
            .count();
        assert_eq!(
            found,
            $count,
            "expected {} warnings matching {}, got {:?}",
            $count,
            stringify!($pattern),
            $warnings
        );
    };
}

/// Asserts that every record has one entry in each list parallel to `life`.
#[macro_export]
macro_rules! assert_life_parallel {
    ($records:expr) => {
        for record in $records.iter() {
            let n = record.cell.life.len();
            assert_eq!(record.cell.life_iucn.len(), n, "life_iucn length at {}", record.key());
            assert_eq!(record.cell.life_density.len(), n, "life_density length at {}", record.key());
            assert_eq!(record.cell.life_prey.len(), n, "life_prey length at {}", record.key());
        }
    };
}
