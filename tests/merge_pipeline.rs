mod common;
use abyssal_core::{JoinError, PipelineError, ScoreError, ScoreInput, Warning};
use abyssal_data::{Biome, CellKey, IucnStatus};
use common::{cell, SurveyBuilder};

#[test]
fn test_one_record_per_base_cell_in_base_order() {
    let survey = SurveyBuilder::new()
        .grid(3, 4, "abyssal_plain")
        .with_hazard(2, 3, "turbidity", 1.0)
        .with_hazard(2, 3, "slide", 0.5)
        .build();
    let summary = survey.run().unwrap();

    assert_eq!(summary.records.len(), 12);
    let keys: Vec<CellKey> = summary.records.iter().map(|r| r.key()).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert_eq!(cell(&summary.records, 2, 3).cell.hazards.len(), 2);
    assert!(summary.records.iter().all(|r| r.cell.cell.biome == Biome::Plain));
}

#[test]
fn test_absent_relations_are_empty_sequences() {
    let survey = SurveyBuilder::new()
        .with_cell(0, 0, Some(1000.0), "slope")
        .with_cell(0, 1, Some(1000.0), "slope")
        .with_resource(0, 0, "nodules", 3.0, 7.0)
        .build();
    let summary = survey.run().unwrap();

    let first = cell(&summary.records, 0, 0);
    assert_eq!(first.cell.resources.len(), 1);
    assert!(first.cell.hazards.is_empty());
    assert_eq!(first.total_value, 21.0);

    let second = cell(&summary.records, 0, 1);
    assert!(second.cell.resources.is_empty());
    assert!(second.cell.hazards.is_empty());
    assert!(second.cell.life.is_empty());
    assert!(second.cell.poi.is_empty());
    assert!(second.cell.coral.is_none());
    assert_eq!(second.total_value, 0.0);
    assert_eq!(second.score, 0.0);
}

#[test]
fn test_life_rows_flatten_with_parallel_status() {
    let survey = SurveyBuilder::new()
        .grid(2, 2, "trench")
        .with_life(1, 1, "Snailfish", "EN", " Ray, Squid")
        .with_life(1, 1, "Cusk eel", "", "")
        .with_life(0, 0, "", "CR", "Krill")
        .build();
    let summary = survey.run().unwrap();

    let life_cell = cell(&summary.records, 1, 1);
    assert_eq!(life_cell.cell.life, vec!["Snailfish", "Cusk eel"]);
    assert_eq!(
        life_cell.cell.life_iucn,
        vec![IucnStatus::Endangered, IucnStatus::DataDeficient]
    );
    assert_eq!(life_cell.cell.life_prey[0], vec!["Ray", "Squid"]);
    assert!(life_cell.cell.life_prey[1].is_empty());

    // A row with no species contributes nothing, even when threatened.
    assert!(cell(&summary.records, 0, 0).cell.life.is_empty());
    crate::assert_life_parallel!(summary.records);
}

#[test]
fn test_threatened_life_lowers_score() {
    let survey = SurveyBuilder::new()
        .with_cell(0, 0, Some(1000.0), "seamount")
        .with_cell(0, 1, Some(1000.0), "seamount")
        .with_resource(0, 0, "crusts", 10.0, 10.0)
        .with_resource(0, 1, "crusts", 10.0, 10.0)
        .with_life(0, 1, "Black coral, Glass sponge", "VU", "")
        .build();
    let summary = survey.run().unwrap();

    let clean = cell(&summary.records, 0, 0);
    let threatened = cell(&summary.records, 0, 1);
    // difficulty = 1 + 1000/1000 + 100/100 = 3
    assert_eq!(clean.difficulty, 3.0);
    assert_eq!(threatened.difficulty, 3.0);
    assert!((clean.score - 100.0 / 3.0).abs() < 1e-9);
    assert!((threatened.score - (100.0 / 3.0 - 4.0)).abs() < 1e-9);
}

#[test]
fn test_orphan_rows_warn_and_do_not_fail() {
    let survey = SurveyBuilder::new()
        .grid(2, 2, "slope")
        .with_resource(5, 5, "nodules", 1.0, 1.0)
        .with_poi(0, 0, "Wreck")
        .with_poi(9, 0, "Lost buoy")
        .with_food_web("hydrothermal_vent", "Vent crab", "Tubeworm", Some(0.5))
        .build();
    let summary = survey.run().unwrap();

    assert_eq!(summary.records.len(), 4);
    crate::assert_warnings!(summary.warnings, Warning::OrphanReference { .. }, 2);
    crate::assert_warnings!(summary.warnings, Warning::OrphanBiome { .. }, 1);
    assert_eq!(cell(&summary.records, 0, 0).cell.poi, vec!["Wreck"]);
    assert!(summary.records.iter().all(|r| r.cell.food_web.is_empty()));
}

#[test]
fn test_unconfigured_tables_are_reported_as_skipped() {
    let survey = SurveyBuilder::new().grid(1, 1, "plain").build();
    let summary = survey.run().unwrap();
    crate::assert_warnings!(summary.warnings, Warning::SourceSkipped { .. }, 7);
}

#[test]
fn test_food_web_broadcast_is_identical_per_biome() {
    let survey = SurveyBuilder::new()
        .with_cell(0, 0, Some(900.0), "seamount")
        .with_cell(0, 1, Some(1200.0), "trench")
        .with_cell(1, 0, Some(950.0), "seamount")
        .with_cell(1, 1, Some(5000.0), "trench")
        .with_food_web("seamount", "Orange roughy", ",Shrimp,, Lanternfish ", Some(0.7))
        .with_food_web("seamount", "Shark", "Orange roughy", None)
        .with_food_web("hadal trench", "Snailfish", "Amphipod", Some(0.2))
        .build();
    let summary = survey.run().unwrap();

    let a = cell(&summary.records, 0, 0);
    let b = cell(&summary.records, 1, 0);
    assert_eq!(a.cell.food_web, b.cell.food_web);
    assert_eq!(a.cell.food_web.len(), 2);
    assert_eq!(a.cell.food_web[0].prey, vec!["Shrimp", "Lanternfish"]);
    assert_eq!(a.cell.food_web[1].interaction_strength, None);

    let trench = cell(&summary.records, 1, 1);
    assert_eq!(trench.cell.food_web.len(), 1);
    assert_eq!(trench.cell.food_web[0].predator, "Snailfish");
    assert_eq!(cell(&summary.records, 0, 1).cell.food_web, trench.cell.food_web);
}

#[test]
fn test_unlisted_biome_labels_never_share_food_web() {
    let survey = SurveyBuilder::new()
        .with_cell(0, 0, Some(800.0), "cold_seep")
        .with_cell(0, 1, Some(900.0), "abyssal_hills")
        .with_food_web("kelp_forest", "Sea otter", "Urchin", Some(0.9))
        .with_food_web("cold seep", "Ice worm", "Bacteria", None)
        .with_food_web("cold_seep", "Eelpout", "Ice worm", Some(0.3))
        .build();
    let summary = survey.run().unwrap();

    let seep = cell(&summary.records, 0, 0);
    assert_eq!(seep.cell.cell.biome, Biome::Other("cold_seep".into()));
    let predators: Vec<&str> = seep.cell.food_web.iter().map(|e| e.predator.as_str()).collect();
    assert_eq!(predators, vec!["Eelpout"]);
    assert!(cell(&summary.records, 0, 1).cell.food_web.is_empty());
    crate::assert_warnings!(summary.warnings, Warning::OrphanBiome { .. }, 2);
}

#[test]
fn test_duplicate_coral_last_row_wins_with_warning() {
    let survey = SurveyBuilder::new()
        .grid(2, 2, "slope")
        .with_coral(1, 0, 12.0)
        .with_coral(1, 0, 34.0)
        .with_current(0, 1, 0.3, 0.4)
        .build();
    let summary = survey.run().unwrap();

    let coral = cell(&summary.records, 1, 0).cell.coral.as_ref().unwrap();
    assert_eq!(coral.cover_pct, Some(34.0));
    crate::assert_warnings!(summary.warnings, Warning::DuplicateSingular { .. }, 1);

    let current = cell(&summary.records, 0, 1).cell.current.as_ref().unwrap();
    assert!((current.speed_mps.unwrap() - 0.5).abs() < 1e-12);
    assert_eq!(current.flow_direction.as_deref(), Some("NE"));
}

#[test]
fn test_missing_depth_aborts_before_export() {
    let survey = SurveyBuilder::new()
        .with_cell(0, 0, Some(1000.0), "plain")
        .with_cell(0, 1, None, "plain")
        .build();
    let err = survey.run().unwrap_err();

    let score_err = err
        .chain()
        .find_map(|e| e.downcast_ref::<PipelineError>())
        .expect("pipeline error in chain");
    assert!(matches!(
        score_err,
        PipelineError::Score(ScoreError::MissingInput {
            key: CellKey { row: 0, col: 1 },
            input: ScoreInput::Depth,
        })
    ));
    assert!(format!("{err:#}").contains("(0, 1)"));
    assert!(!survey.output().exists());
    assert!(!survey.path("out/merge_report.json").exists());
}

#[test]
fn test_failed_side_output_leaves_no_artifact() {
    let mut survey = SurveyBuilder::new().grid(2, 2, "slope").build();
    let blocker = survey.path("blocker");
    std::fs::create_dir(&blocker).unwrap();
    survey.config.export.report = Some(blocker);

    let err = survey.run().unwrap_err();
    assert!(format!("{err:#}").contains("writing run report"));
    assert!(!survey.output().exists());
    assert!(!survey.output().with_extension("tmp").exists());
}

#[test]
fn test_failed_rerun_keeps_previous_artifact() {
    let mut survey = SurveyBuilder::new().grid(2, 2, "slope").build();
    survey.run().unwrap();
    let before = std::fs::read(survey.output()).unwrap();

    let json = survey.path("json_blocker");
    std::fs::create_dir(&json).unwrap();
    survey.config.export.json = Some(json);
    assert!(survey.run().is_err());

    assert_eq!(std::fs::read(survey.output()).unwrap(), before);
    assert!(!survey.output().with_extension("tmp").exists());
}

#[test]
fn test_missing_pressure_names_the_cell() {
    let survey = SurveyBuilder::new()
        .with_cell_fields(0, 0, Some(1000.0), "plain", None)
        .build();
    let err = survey.run().unwrap_err();
    assert!(format!("{err:#}").contains("(0, 0)"));
    assert!(!survey.output().exists());
}

#[test]
fn test_duplicate_base_cell_is_fatal() {
    let survey = SurveyBuilder::new()
        .with_cell(0, 0, Some(1000.0), "plain")
        .with_cell(0, 0, Some(2000.0), "plain")
        .build();
    let err = survey.run().unwrap_err();
    let join_err = err.chain().find_map(|e| e.downcast_ref::<PipelineError>());
    assert!(matches!(
        join_err,
        Some(PipelineError::Join(JoinError::DuplicateCell { .. }))
    ));
}

#[test]
fn test_sparse_grid_needs_opt_in() {
    let sparse = || {
        SurveyBuilder::new()
            .with_cell(0, 0, Some(1000.0), "plain")
            .with_cell(1, 1, Some(1000.0), "plain")
    };

    let err = sparse().build().run().unwrap_err();
    assert!(matches!(
        err.chain().find_map(|e| e.downcast_ref::<PipelineError>()),
        Some(PipelineError::Join(JoinError::IncompleteGrid { .. }))
    ));

    let summary = sparse()
        .with_config(|c| c.pipeline.require_dense_grid = false)
        .build()
        .run()
        .unwrap();
    assert_eq!(summary.records.len(), 2);
}

#[test]
fn test_invalid_source_row_is_fatal() {
    let survey = SurveyBuilder::new()
        .grid(1, 1, "plain")
        .with_hazard(0, 0, "slide", -3.0)
        .build();
    let err = survey.run().unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("hazards.csv:2"), "{message}");
    assert!(!survey.output().exists());
}

#[test]
fn test_run_report_records_stages_and_warnings() {
    let survey = SurveyBuilder::new()
        .grid(2, 2, "plain")
        .with_resource(7, 7, "nodules", 1.0, 1.0)
        .build();
    let summary = survey.run().unwrap();

    let report = abyssal_io::RunReport::load(survey.path("out/merge_report.json")).unwrap();
    assert_eq!(report.cells, 4);
    assert_eq!(report.source_rows["cells"], 4);
    assert_eq!(report.source_rows["resources"], 1);
    assert_eq!(report.warnings, summary.warnings);
    assert_eq!(report.config_fingerprint, survey.config.fingerprint());
    let stages: Vec<&str> = report.metrics.stages().iter().map(|s| s.stage.as_str()).collect();
    assert_eq!(stages, vec!["load", "index", "aggregate", "join", "score", "export"]);
}
