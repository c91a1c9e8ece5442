use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use hemo_database::{DatabasePool, DatabaseQueries, PoolSettings};
use hemo_web::{create_app, AppState};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

async fn setup() -> (Router, AppState) {
    let pool = DatabasePool::in_memory().await.unwrap();
    DatabaseQueries::new(&pool).create_tables().await.unwrap();
    let state = AppState::new(pool);
    (create_app(state.clone()), state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn patient(nome: &str, codice_fiscale: &str) -> Value {
    json!({
        "nome": nome,
        "cognome": "B",
        "data_nascita": "1970-12-31",
        "codice_fiscale": codice_fiscale,
        "patologia": "anemia sideropenica",
        "sesso": "F"
    })
}

fn acquisition(hb_value: &str) -> Value {
    json!({
        "hb_value": hb_value,
        "acquisition_date": "2024-06-01",
        "acquisition_uri": "https://storage.example/acq/1.jpg",
        "acquisition_type": "foto"
    })
}

async fn register_and_login(app: &Router, username: &str, password: &str) -> i64 {
    let creds = json!({ "username": username, "password": password });
    let (status, _) = send(app, "POST", "/registra_medico", Some(creds.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(app, "POST", "/login_medico", Some(creds)).await;
    assert_eq!(status, StatusCode::OK);
    body.as_i64().unwrap()
}

#[tokio::test]
async fn test_create_patient_under_clinician_and_list() {
    let (app, _) = setup().await;
    let clinician_id = register_and_login(&app, "dott.rossi", "pw").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/salva_paziente/{}", clinician_id),
        Some(patient("A", "AAAAAA00A00A000A")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Paziente salvato con successo");

    let (status, body) = send(&app, "GET", &format!("/get_pazienti/{}", clinician_id), None).await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["nome"], "A");
    assert!(list[0]["id"].as_i64().is_some());
}

#[tokio::test]
async fn test_patient_roundtrip() {
    let (app, _) = setup().await;

    let payload = patient("Giulia", "GLIBNC85M41H501Z");
    let (status, _) = send(&app, "POST", "/salva_paziente", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = send(&app, "GET", "/get_pazienti", None).await;
    let id = list[0]["id"].as_i64().unwrap();

    let (status, fetched) = send(&app, "GET", &format!("/get_paziente/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, payload);
}

#[tokio::test]
async fn test_get_missing_patient_is_404() {
    let (app, _) = setup().await;
    let (status, body) = send(&app, "GET", "/get_paziente/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Paziente non trovato");
}

#[tokio::test]
async fn test_create_patient_for_unknown_clinician_is_404() {
    let (app, _) = setup().await;
    let (status, _) = send(&app, "POST", "/salva_paziente/12", Some(patient("A", "X1"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = send(&app, "GET", "/get_pazienti", None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_update_patient_overwrites_all_fields() {
    let (app, _) = setup().await;
    send(&app, "POST", "/salva_paziente", Some(patient("Old", "OLD0000000000000"))).await;

    let replacement = json!({
        "nome": "New",
        "cognome": "Name",
        "data_nascita": "2001-01-01",
        "codice_fiscale": "NEW0000000000000",
        "patologia": "nessuna",
        "sesso": "M"
    });
    let (status, body) = send(&app, "PUT", "/update_paziente/1", Some(replacement.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Dati del paziente aggiornati con successo");

    let (_, fetched) = send(&app, "GET", "/get_paziente/1", None).await;
    assert_eq!(fetched, replacement);

    let (status, _) = send(&app, "PUT", "/update_paziente/2", Some(replacement)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_acquisitions_lifecycle_and_cascade_delete() {
    let (app, state) = setup().await;
    send(&app, "POST", "/salva_paziente", Some(patient("P", "P000000000000000"))).await;

    for value in ["11.0", "12.5", "9.8"] {
        let (status, body) = send(&app, "POST", "/salva_acquisizione/1", Some(acquisition(value))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Acquisizione salvata con successo");
    }

    let (status, count) = send(&app, "GET", "/count_acquisizioni/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count, json!(3));

    let (status, list) = send(&app, "GET", "/get_acquisizioni/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 3);
    assert_eq!(list[1], acquisition("12.5"));

    let (status, body) = send(&app, "DELETE", "/delete_paziente/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Paziente e relative acquisizioni eliminate con successo"
    );

    let remaining = DatabaseQueries::new(&state.db)
        .count_acquisitions_by_patient(1)
        .await
        .unwrap();
    assert_eq!(remaining, 0);

    let (status, _) = send(&app, "GET", "/get_acquisizioni/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", "/delete_paziente/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_acquisition_for_missing_patient_writes_nothing() {
    let (app, state) = setup().await;

    let (status, _) = send(&app, "POST", "/salva_acquisizione/7", Some(acquisition("10.0"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/count_acquisizioni/7", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let stored = DatabaseQueries::new(&state.db)
        .count_acquisitions_by_patient(7)
        .await
        .unwrap();
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn test_duplicate_username_is_rejected() {
    let (app, _) = setup().await;
    let creds = json!({ "username": "dott.bianchi", "password": "one" });

    let (status, body) = send(&app, "POST", "/registra_medico", Some(creds.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Medico registrato con successo");

    let (status, _) = send(&app, "POST", "/registra_medico", Some(creds)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registration_never_fails_with_500() {
    // 文件数据库才有多个连接真正并发写入
    let path = std::env::temp_dir().join(format!("hemo-register-{}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let url = format!("sqlite://{}", path.display());

    let pool = DatabasePool::connect(&url, &PoolSettings::default()).await.unwrap();
    DatabaseQueries::new(&pool).create_tables().await.unwrap();
    let app = create_app(AppState::new(pool.clone()));

    let creds = json!({ "username": "dott.gialli", "password": "pw" });
    let handles: Vec<_> = (0..16)
        .map(|_| {
            let app = app.clone();
            let creds = creds.clone();
            tokio::spawn(async move { send(&app, "POST", "/registra_medico", Some(creds)).await })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        match status {
            StatusCode::OK => created += 1,
            StatusCode::BAD_REQUEST => assert_eq!(body["message"], "Username già in uso"),
            other => panic!("unexpected status {}: {}", other, body),
        }
    }
    assert_eq!(created, 1);

    pool.close().await;
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_login_checks_credentials() {
    let (app, _) = setup().await;
    let id = register_and_login(&app, "dott.verdi", "corretta").await;
    assert!(id > 0);

    let (status, _) = send(
        &app,
        "POST",
        "/login_medico",
        Some(json!({ "username": "dott.verdi", "password": "sbagliata" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/login_medico",
        Some(json!({ "username": "sconosciuto", "password": "corretta" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_random_hb_value_in_range() {
    let (app, _) = setup().await;

    for _ in 0..50 {
        let (status, body) = send(&app, "GET", "/random_hb_value", None).await;
        assert_eq!(status, StatusCode::OK);

        let text = body.as_str().unwrap();
        let (_, decimals) = text.split_once('.').unwrap();
        assert_eq!(decimals.len(), 1);
        let value: f64 = text.parse().unwrap();
        assert!((8.0..=17.0).contains(&value));
    }
}

#[tokio::test]
async fn test_missing_field_is_422_with_detail() {
    let (app, _) = setup().await;
    let incomplete = json!({ "nome": "A", "cognome": "B" });

    let (status, body) = send(&app, "POST", "/salva_paziente", Some(incomplete)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["field"], "data_nascita");
}

#[tokio::test]
async fn test_malformed_path_id_is_422_json() {
    let (app, _) = setup().await;

    let (status, body) = send(&app, "GET", "/get_paziente/abc", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], true);
    assert_eq!(body["detail"][0]["field"], "paziente_id");

    let (status, body) = send(&app, "GET", "/get_paziente/99999999999999999999", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["field"], "paziente_id");

    let (status, body) = send(&app, "GET", "/get_pazienti/dott", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["field"], "medico_id");
}

#[tokio::test]
async fn test_oversized_field_is_422() {
    let (app, _) = setup().await;
    let mut payload = patient("A", "TOOLONGFISCALCODE123");
    payload["sesso"] = json!("x".repeat(11));

    let (status, body) = send(&app, "POST", "/salva_paziente", Some(payload)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<_> = body["detail"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(fields, vec!["codice_fiscale", "sesso"]);
}

#[tokio::test]
async fn test_duplicate_fiscal_code_surfaces_as_server_error() {
    let (app, _) = setup().await;
    send(&app, "POST", "/salva_paziente", Some(patient("A", "SAME000000000000"))).await;

    let (status, _) = send(&app, "POST", "/salva_paziente", Some(patient("B", "SAME000000000000"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_health_and_root() {
    let (app, _) = setup().await;

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "Hemo API");
}
