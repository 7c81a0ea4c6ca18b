//! Scrape to prediction through the file-based pipeline.

use gradrate::data::{
    ExtractionFault, FillSource, InstitutionRecord, records_to_frame, split_features_and_target,
    write_csv,
};
use gradrate::eval::{CrossValidationConfig, ModelArtifact, TrainerConfig, comparison_table};
use gradrate::models::ModelFamily;
use gradrate::{
    PipelineConfig, compare_families, evaluate_dataset, load_feature_table, predict_frame,
    prepare_dataset, scrape_dataset, train_final_model,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::PathBuf;

fn workdir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("gradrate-{name}-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn config(dir: &PathBuf) -> PipelineConfig {
    PipelineConfig {
        reference_path: dir.join("reference.csv"),
        raw_path: dir.join("college_raw.csv"),
        features_path: dir.join("five_college_df.csv"),
        artifact_path: dir.join("linear_regression.json"),
        ..PipelineConfig::default()
    }
}

/// Institution whose graduation rate follows retention and GPA.
fn institution(id: &str, rng: &mut StdRng) -> InstitutionRecord {
    let retention: f64 = rng.gen_range(55.0..95.0);
    let gpa: f64 = rng.gen_range(2.8..4.0);
    let admitted: f64 = rng.gen_range(5.0..99.0);
    let public = rng.gen_bool(0.5);
    InstitutionRecord {
        state: Some("OH".to_string()),
        size_undergrads: Some(rng.gen_range(800.0..40_000.0)),
        percent_admitted: Some(admitted),
        in_state_tuition: Some(rng.gen_range(6_000.0..50_000.0)),
        out_state_tuition: Some(rng.gen_range(15_000.0..55_000.0)),
        sector: Some(if public { "Public" } else { "Private not-for-profit" }.to_string()),
        average_gpa: if rng.gen_bool(0.2) { None } else { Some(gpa) },
        percent_part_time: Some(rng.gen_range(0.0..30.0)),
        admission_test: Some(
            if rng.gen_bool(0.5) { "Required" } else { "Considered but not required" }.to_string(),
        ),
        median_sat_verbal: Some(rng.gen_range(450.0..720.0)),
        median_sat_math: Some(rng.gen_range(450.0..760.0)),
        median_act_composite: Some(rng.gen_range(18.0..34.0)),
        percent_underrep_minority: Some(rng.gen_range(5.0..60.0)),
        pell_percent: Some(rng.gen_range(10.0..60.0)),
        retention_rate: Some(retention),
        four_year_grad_rate: Some(retention * 0.5),
        five_year_grad_rate: Some(0.9 * retention + 8.0 * gpa - 30.0 + rng.gen_range(-2.0..2.0)),
        six_year_grad_rate: Some(retention * 0.8),
        ..InstitutionRecord::new(id.to_string(), format!("College {id}"))
    }
}

#[test]
fn test_scrape_prepare_train_predict() {
    let dir = workdir("pipeline");
    let config = config(&dir);

    let mut reference = String::from("ipeds_id,college\n");
    for id in 100_000..100_045 {
        reference.push_str(&format!("{id},College {id}\n"));
    }
    fs::write(&config.reference_path, reference).unwrap();

    let extractor = |id: &str| -> Result<InstitutionRecord, ExtractionFault> {
        let n: u64 = id.parse().unwrap();
        if n % 9 == 0 {
            return Err(ExtractionFault::Status { id: id.to_string(), status: 404 });
        }
        Ok(institution(id, &mut StdRng::seed_from_u64(n)))
    };

    let assembly = scrape_dataset(&config, &extractor, None).unwrap();
    assert_eq!(assembly.stats.attempted, 45);
    assert_eq!(assembly.stats.skipped, 5);
    assert_eq!(assembly.frame.height(), 40);

    let mut raw = assembly.frame.clone();
    write_csv(&mut raw, &config.raw_path).unwrap();

    let mut encoded = prepare_dataset(&assembly.frame, FillSource::CohortMean).unwrap();
    assert_eq!(encoded.height(), 40);
    write_csv(&mut encoded, &config.features_path).unwrap();

    let table = load_feature_table(&config).unwrap();
    assert_eq!(table.n_samples(), 40);
    assert!(!table.feature_names().iter().any(|n| n == "ipeds_id"));

    let mut rng = StdRng::seed_from_u64(3);
    let report = evaluate_dataset(&table, CrossValidationConfig::default(), &mut rng).unwrap();
    assert_eq!(report.folds.len(), 5);
    assert!(report.mean_validation_r2.is_finite());

    let reports = compare_families(&table, 0.1, 5, &mut rng).unwrap();
    assert_eq!(reports.len(), 6);
    assert!(comparison_table(&reports).contains("Best by validation R^2"));

    let trainer = TrainerConfig {
        family: ModelFamily::Ridge { alpha: 0.1 },
        ..TrainerConfig::default()
    };
    let (outcome, artifact) = train_final_model(&table, trainer, &mut rng).unwrap();
    assert_eq!(outcome.test_indices.len(), 8);
    artifact.save(&config.artifact_path).unwrap();

    let loaded = ModelArtifact::load(&config.artifact_path).unwrap();
    let prediction = predict_frame(&loaded, &encoded).unwrap();
    assert_eq!(prediction.values.len(), 40);
    assert!(prediction.r2.is_some_and(|r2| r2 > 0.5));
    assert!(prediction.mse.is_some());

    let unlabeled = encoded.drop(&loaded.target).unwrap();
    let prediction = predict_frame(&loaded, &unlabeled).unwrap();
    assert_eq!(prediction.r2, None);
    assert_eq!(prediction.values.len(), 40);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_missing_part_time_share_is_filled() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut records: Vec<InstitutionRecord> = (0..6)
        .map(|i| institution(&format!("20000{i}"), &mut rng))
        .collect();
    records[0].average_gpa = Some(3.4);
    records[2].percent_part_time = None;

    let raw = records_to_frame(&records).unwrap();
    let encoded = prepare_dataset(&raw, FillSource::CohortMean).unwrap();

    assert_eq!(encoded.height(), 6);
    assert_eq!(encoded.column("percent_part_time").unwrap().null_count(), 0);
    assert!(encoded.get_columns().iter().all(|c| c.null_count() == 0));
}

#[test]
fn test_default_trainer_scales_features() {
    let mut rng = StdRng::seed_from_u64(5);
    let records: Vec<InstitutionRecord> = (0..30)
        .map(|i| institution(&format!("30000{i}"), &mut rng))
        .collect();
    let raw = records_to_frame(&records).unwrap();
    let encoded = prepare_dataset(&raw, FillSource::default()).unwrap();
    let table =
        split_features_and_target(&encoded, "five_year_grad_rate", Some("ipeds_id")).unwrap();

    let (_, artifact) = train_final_model(&table, TrainerConfig::default(), &mut rng).unwrap();
    assert!(artifact.model.scaler().is_some());
}

#[test]
fn test_missing_feature_file_is_error() {
    let config = PipelineConfig {
        features_path: PathBuf::from("/nonexistent/gradrate/five_college_df.csv"),
        ..PipelineConfig::default()
    };
    assert!(load_feature_table(&config).is_err());
}
