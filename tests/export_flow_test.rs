use anyhow::Result;
use aod_export::{
    connect, EarthEngineClient, EarthEngineConfig, ExportConfig, ExportEngine, ExportError,
    InteractiveAuthenticator, OAuthClient, Session,
};
use httpmock::prelude::*;
use serde_json::json;

const EXPORT_PATH: &str = "/v1/projects/test-project/image:export";

fn client_for(server: &MockServer) -> EarthEngineClient {
    let config = EarthEngineConfig {
        api_base_url: server.base_url(),
        project: Some("test-project".to_string()),
        ..Default::default()
    };
    let session = Session {
        access_token: "test-token".to_string(),
        project: None,
    };
    EarthEngineClient::new(&config, session)
}

fn years(start_year: i32, end_year: i32) -> ExportConfig {
    ExportConfig {
        start_year,
        end_year,
        ..Default::default()
    }
}

/// 2020..=2021 registers exactly two exports, each clipped, scaled and
/// projected as configured.
#[tokio::test]
async fn test_two_year_run_submits_two_tasks() -> Result<()> {
    let server = MockServer::start();

    let mocks: Vec<_> = [2020, 2021]
        .iter()
        .map(|year| {
            server.mock(|when, then| {
                when.method(POST)
                    .path(EXPORT_PATH)
                    .header("Authorization", "Bearer test-token")
                    .body_contains(format!("\"description\":\"Annual_Mean_AOD_{}_USA\"", year))
                    .body_contains(format!("\"filenamePrefix\":\"AOD_{}_USA\"", year))
                    .body_contains("\"folder\":\"GEE_Exports\"")
                    .body_contains("\"crsCode\":\"EPSG:4326\"")
                    .body_contains("\"maxPixels\":\"10000000000000\"")
                    .body_contains("\"functionName\":\"Image.clip\"")
                    .body_contains("\"tableId\":{\"constantValue\":\"USDOS/LSIB_SIMPLE/2017\"}")
                    .body_contains("\"scale\":{\"constantValue\":1000.0}");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(json!({
                        "name": format!("projects/test-project/operations/OP{}", year),
                        "metadata": {
                            "@type": "type.googleapis.com/google.earthengine.v1.OperationMetadata",
                            "state": "PENDING",
                            "description": format!("Annual_Mean_AOD_{}_USA", year)
                        }
                    }));
            })
        })
        .collect();

    let engine = ExportEngine::new(client_for(&server), years(2020, 2021));
    let submitted = engine.run().await?;

    assert_eq!(submitted.len(), 2);
    assert_eq!(submitted[0].handle.id(), "OP2020");
    assert_eq!(submitted[1].handle.id(), "OP2021");
    assert_eq!(submitted[0].handle.state.as_deref(), Some("PENDING"));
    for mock in &mocks {
        mock.assert();
    }

    Ok(())
}

#[tokio::test]
async fn test_single_year_run_submits_one_task() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path(EXPORT_PATH);
        then.status(200)
            .json_body(json!({ "name": "projects/test-project/operations/ONLY" }));
    });

    let engine = ExportEngine::new(client_for(&server), years(2019, 2019));
    let submitted = engine.run().await?;

    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].year, 2019);
    assert_eq!(submitted[0].description, "Annual_Mean_AOD_2019_USA");
    assert!(submitted[0].handle.state.is_none());
    mock.assert_hits(1);

    Ok(())
}

#[tokio::test]
async fn test_remote_error_aborts_run() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path(EXPORT_PATH);
        then.status(403).json_body(json!({
            "error": { "code": 403, "message": "Permission denied", "status": "PERMISSION_DENIED" }
        }));
    });

    let engine = ExportEngine::new(client_for(&server), years(2015, 2024));
    let err = engine.run().await.unwrap_err();

    match err {
        ExportError::RemoteError { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "Permission denied");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    // no retry, and no further years after the failure
    mock.assert_hits(1);

    Ok(())
}

#[tokio::test]
async fn test_non_json_error_body_is_kept_verbatim() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(EXPORT_PATH);
        then.status(502).body("Bad Gateway");
    });

    let engine = ExportEngine::new(client_for(&server), years(2020, 2020));
    let err = engine.run().await.unwrap_err();

    assert!(matches!(
        err,
        ExportError::RemoteError { status: 502, ref message } if message == "Bad Gateway"
    ));

    Ok(())
}

/// With no project configured, exports go to the project saved with the
/// cached credentials.
#[tokio::test]
async fn test_project_from_cached_credentials_is_used() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/token");
        then.status(200)
            .json_body(json!({ "access_token": "ya29.cached" }));
    });
    let export_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/projects/p/image:export")
            .header("Authorization", "Bearer ya29.cached");
        then.status(200)
            .json_body(json!({ "name": "projects/p/operations/FROM_CACHE" }));
    });

    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("credentials");
    std::fs::write(&path, r#"{"refresh_token":"r","project":"p"}"#)?;

    let config = EarthEngineConfig {
        api_base_url: server.base_url(),
        oauth_token_url: server.url("/token"),
        client_id: Some("client-123".to_string()),
        client_secret: Some("secret-456".to_string()),
        ..Default::default()
    };
    let oauth = OAuthClient::new(config.clone());
    let authenticator = InteractiveAuthenticator::new(oauth.clone(), path.clone());
    let session = connect(&oauth, &path, &authenticator).await?;

    let client = EarthEngineClient::new(&config, session);
    assert_eq!(client.project(), "p");

    let submitted = ExportEngine::new(client, years(2020, 2020)).run().await?;
    assert_eq!(submitted[0].handle.id(), "FROM_CACHE");
    export_mock.assert();

    Ok(())
}

#[test]
fn test_configured_project_wins_over_cached_one() {
    let config = EarthEngineConfig {
        project: Some("override".to_string()),
        ..Default::default()
    };
    let session = Session {
        access_token: "t".to_string(),
        project: Some("cached".to_string()),
    };
    let client = EarthEngineClient::new(&config, session);
    assert_eq!(client.project(), "override");

    let fallback = EarthEngineClient::new(
        &EarthEngineConfig::default(),
        Session {
            access_token: "t".to_string(),
            project: None,
        },
    );
    assert_eq!(fallback.project(), "earthengine-legacy");
}
