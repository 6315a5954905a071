use anyhow::Result;
use field_jobs::{AppConfig, DefectReport, JobDispatcher, PhotoMetadata};
use httpmock::prelude::*;
use tempfile::TempDir;

const JOBS_CSV: &str = "\
ID,Customer,Address,Phone,Email,Type,Status,Priority,Installer,Technician,Notes,Materials,Access
J-1,Jane Doe,1 Main St,555-0100,jane@example.com,Install,Scheduled,High,INS-1,Tech A,,\"panel,inverter\",Side gate
";

const INSTALLERS_CSV: &str = "\
Key,Name,Email,Crew
INS-1,Sam,sam@example.com,INS-2
";

fn seed_workbook(dir: &TempDir) -> Result<()> {
    std::fs::write(dir.path().join("Jobs.csv"), JOBS_CSV)?;
    std::fs::write(dir.path().join("Installers.csv"), INSTALLERS_CSV)?;
    Ok(())
}

fn config_for(backend: &str, workbook: &TempDir, supabase_url: &str) -> Result<AppConfig> {
    let toml = format!(
        r#"
[data_source]
backend = "{}"

[google]
workbook_dir = "{}"

[supabase]
url = "{}"
key = "anon-key"
"#,
        backend,
        workbook.path().to_str().unwrap().replace('\\', "/"),
        supabase_url
    );
    Ok(AppConfig::from_toml_str(&toml)?)
}

fn sample_photo() -> PhotoMetadata {
    PhotoMetadata {
        file_name: "roof.jpg".to_string(),
        url: "https://files.example.com/roof.jpg".to_string(),
        ..Default::default()
    }
}

fn sample_defect() -> DefectReport {
    DefectReport {
        category: "Electrical".to_string(),
        severity: "High".to_string(),
        description: "Loose breaker".to_string(),
        photo_urls: vec![],
    }
}

/// Google 設定下五個操作都只碰 CSV 工作簿，Supabase 完全沒有被呼叫
#[tokio::test]
async fn test_google_selector_never_calls_supabase() -> Result<()> {
    let workbook = TempDir::new()?;
    seed_workbook(&workbook)?;

    let server = MockServer::start();
    let any_call = server.mock(|when, then| {
        when.path_contains("/rest/v1/");
        then.status(200).json_body(serde_json::json!([]));
    });

    let config = config_for("google", &workbook, &server.base_url())?;
    let dispatcher = JobDispatcher::from_config(&config);

    let jobs = dispatcher.get_jobs("INS-1", &[]).await;
    let status = dispatcher.save_job_status("J-1", "Complete", "INS-1", "done").await;
    let installer = dispatcher.get_installer_info("INS-1").await;
    let photo = dispatcher.save_photo_metadata("J-1", &sample_photo(), "INS-1").await;
    let defect = dispatcher.save_defect_report("J-1", &sample_defect(), "INS-1").await;

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].materials, vec!["panel", "inverter"]);
    assert_eq!(status.message, "Status saved to Google Sheets");
    assert_eq!(installer.unwrap().crew_keys, vec!["INS-2"]);
    assert!(photo.success);
    assert!(defect.success);

    assert!(workbook.path().join("JobStatusUpdates.csv").exists());
    assert!(workbook.path().join("PhotoMetadata.csv").exists());
    assert!(workbook.path().join("DefectReports.csv").exists());
    any_call.assert_hits(0);
    Ok(())
}

/// Supabase 設定下五個操作都走 REST，工作簿保持不變
#[tokio::test]
async fn test_supabase_selector_never_touches_workbook() -> Result<()> {
    let workbook = TempDir::new()?;
    seed_workbook(&workbook)?;

    let server = MockServer::start();
    let jobs_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/jobs")
            .query_param("installer_key", "eq.INS-1");
        then.status(200).json_body(serde_json::json!([
            {"id": "J-1", "customerName": "Jane Doe", "materials": ["panel", "inverter"]}
        ]));
    });
    let status_mock = server.mock(|when, then| {
        when.method(POST).path("/rest/v1/job_status_updates");
        then.status(201);
    });
    let installer_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/installers")
            .query_param("limit", "1");
        then.status(200).json_body(serde_json::json!([
            {"installer_key": "INS-1", "name": "Sam", "crew_keys": ["INS-2"]}
        ]));
    });
    let photo_mock = server.mock(|when, then| {
        when.method(POST).path("/rest/v1/job_photos");
        then.status(201);
    });
    let defect_mock = server.mock(|when, then| {
        when.method(POST).path("/rest/v1/defect_reports");
        then.status(201);
    });

    let config = config_for("supabase", &workbook, &server.base_url())?;
    let dispatcher = JobDispatcher::from_config(&config);

    let jobs = dispatcher.get_jobs("INS-1", &[]).await;
    let status = dispatcher.save_job_status("J-1", "Complete", "INS-1", "done").await;
    let installer = dispatcher.get_installer_info("INS-1").await;
    let photo = dispatcher.save_photo_metadata("J-1", &sample_photo(), "INS-1").await;
    let defect = dispatcher.save_defect_report("J-1", &sample_defect(), "INS-1").await;

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].materials, vec!["panel", "inverter"]);
    assert_eq!(status.message, "Status saved to Supabase");
    assert_eq!(installer.unwrap().crew_keys, vec!["INS-2"]);
    assert!(photo.success);
    assert!(defect.success);

    jobs_mock.assert();
    status_mock.assert();
    installer_mock.assert();
    photo_mock.assert();
    defect_mock.assert();

    let entries: Vec<_> = std::fs::read_dir(workbook.path())?.collect();
    assert_eq!(entries.len(), 2);
    Ok(())
}

/// 託管來源不處理 crew：只看到自己的工單
#[tokio::test]
async fn test_supabase_ignores_crew_keys() -> Result<()> {
    let workbook = TempDir::new()?;
    let server = MockServer::start();
    let own_jobs = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/jobs")
            .query_param("installer_key", "eq.INS-1");
        then.status(200).json_body(serde_json::json!([{"id": "J-1"}]));
    });
    let crew_jobs = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/jobs")
            .query_param("installer_key", "eq.INS-2");
        then.status(200).json_body(serde_json::json!([{"id": "J-2"}]));
    });

    let config = config_for("supabase", &workbook, &server.base_url())?;
    let dispatcher = JobDispatcher::from_config(&config);

    let jobs = dispatcher.get_jobs("INS-1", &["INS-2".to_string()]).await;

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].id, "J-1");
    own_jobs.assert_hits(1);
    crew_jobs.assert_hits(0);
    Ok(())
}
