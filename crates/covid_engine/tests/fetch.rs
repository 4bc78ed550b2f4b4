use std::time::Duration;

use covid_engine::{
    decode_statewise, FailureKind, FetchSettings, ReqwestStatsSource, RequestMethod, StateStats,
    StatsSource, TotalStats,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BODY: &str = r#"{
  "success": true,
  "data": {
    "source": "covid19india.org",
    "lastRefreshed": "2020-06-01T10:00:00.000Z",
    "total": { "confirmed": 40, "recovered": 12, "deaths": 2, "active": 26 },
    "statewise": [
      { "state": "Kerala", "confirmed": 10, "recovered": 5, "deaths": 1, "active": 4 },
      { "state": "Delhi", "confirmed": 20, "recovered": 7, "deaths": 1, "active": 12 },
      { "state": "Goa", "confirmed": 10 }
    ]
  }
}"#;

fn settings_for(server: &MockServer, route: &str) -> FetchSettings {
    FetchSettings {
        endpoint: format!("{}{}", server.uri(), route),
        ..FetchSettings::default()
    }
}

#[tokio::test]
async fn source_posts_and_decodes_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/statewise"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(BODY, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let source = ReqwestStatsSource::new(settings_for(&server, "/statewise"));
    let snapshot = source.fetch_statewise().await.expect("fetch ok");

    assert_eq!(
        snapshot.total,
        TotalStats {
            confirmed: 40,
            recovered: 12,
            deaths: 2,
            active: 26
        }
    );
    let names: Vec<_> = snapshot.states.iter().map(|s| s.state.as_str()).collect();
    assert_eq!(names, vec!["Kerala", "Delhi", "Goa"]);
    assert_eq!(
        snapshot.states[2],
        StateStats {
            state: "Goa".into(),
            confirmed: 10,
            ..StateStats::default()
        }
    );
}

#[tokio::test]
async fn source_can_use_get() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/statewise"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(BODY, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let settings = FetchSettings {
        method: RequestMethod::Get,
        ..settings_for(&server, "/statewise")
    };
    let snapshot = ReqwestStatsSource::new(settings)
        .fetch_statewise()
        .await
        .expect("fetch ok");
    assert_eq!(snapshot.states.len(), 3);
}

#[tokio::test]
async fn source_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/statewise"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let source = ReqwestStatsSource::new(settings_for(&server, "/statewise"));
    let err = source.fetch_statewise().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
}

#[tokio::test]
async fn source_reports_malformed_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/statewise"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"data": {"total": {}}}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let source = ReqwestStatsSource::new(settings_for(&server, "/statewise"));
    let err = source.fetch_statewise().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn source_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_raw(BODY, "application/json"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..settings_for(&server, "/slow")
    };
    let err = ReqwestStatsSource::new(settings)
        .fetch_statewise()
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn source_rejects_too_large_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/large"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(BODY, "application/json"))
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 10,
        ..settings_for(&server, "/large")
    };
    let err = ReqwestStatsSource::new(settings)
        .fetch_statewise()
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(BODY.len() as u64)
        }
    );
}

#[tokio::test]
async fn source_rejects_non_http_endpoint() {
    let settings = FetchSettings {
        endpoint: "ftp://example.com/statewise".into(),
        ..FetchSettings::default()
    };
    let err = ReqwestStatsSource::new(settings)
        .fetch_statewise()
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);

    let settings = FetchSettings {
        endpoint: "not a url".into(),
        ..FetchSettings::default()
    };
    let err = ReqwestStatsSource::new(settings)
        .fetch_statewise()
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

#[test]
fn decode_defaults_missing_total() {
    let snapshot =
        decode_statewise(br#"{"data": {"statewise": [{"state": "Goa", "active": 3}]}}"#).unwrap();
    assert_eq!(snapshot.total, TotalStats::default());
    assert_eq!(snapshot.states[0].active, 3);
}
