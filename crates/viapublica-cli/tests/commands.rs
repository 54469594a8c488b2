//! Command flows across separate invocations sharing one session file.

use std::path::Path;
use viapublica_cli::commands::{self, access, account, matrix};
use viapublica_cli::CliConfig;
use viapublica_guards::Render;
use viapublica_session::DEMO_PASSWORD;

fn config_in(dir: &Path) -> CliConfig {
    CliConfig {
        session_file: dir.join("session").join("viapublica_user.json"),
        ..CliConfig::default()
    }
}

fn text(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap()
}

#[tokio::test]
async fn login_survives_into_the_next_invocation() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let auth = commands::open_service(&config).await.unwrap();
    let mut out = Vec::new();
    account::login(&auth, "admin@viapublica.demo", DEMO_PASSWORD, &mut out)
        .await
        .unwrap();
    assert!(text(out).contains("as administrator"));
    drop(auth);

    let next = commands::open_service(&config).await.unwrap();
    let mut out = Vec::new();
    let outcome = access::visit(&next.context(), "/admin", &config.guard, &mut out)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        access::VisitOutcome::Guarded {
            render: Render::Content,
            navigated_to: None,
        }
    );
}

#[tokio::test]
async fn standard_user_is_turned_away_from_publishing() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let auth = commands::open_service(&config).await.unwrap();
    account::login(&auth, "usuario@viapublica.demo", DEMO_PASSWORD, &mut Vec::new())
        .await
        .unwrap();

    let mut out = Vec::new();
    let outcome = access::visit(&auth.context(), "/publicar-espacio", &config.guard, &mut out)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        access::VisitOutcome::Guarded {
            render: Render::Blank,
            navigated_to: Some("/acceso-denegado".into()),
        }
    );
    assert!(text(out).contains("denied-no-capability"));
}

#[tokio::test]
async fn logout_sends_the_next_visit_to_login() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let auth = commands::open_service(&config).await.unwrap();
    account::login(&auth, "agencia@viapublica.demo", DEMO_PASSWORD, &mut Vec::new())
        .await
        .unwrap();
    account::logout(&auth, &mut Vec::new()).await.unwrap();
    assert!(!config.session_file.exists());

    let next = commands::open_service(&config).await.unwrap();
    let outcome = access::visit(&next.context(), "/favoritos", &config.guard, &mut Vec::new())
        .await
        .unwrap();
    assert_eq!(
        outcome,
        access::VisitOutcome::Guarded {
            render: Render::Blank,
            navigated_to: Some("/auth/login".into()),
        }
    );
}

#[tokio::test]
async fn public_paths_and_unknown_paths() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let auth = commands::open_service(&config).await.unwrap();

    let outcome = access::visit(&auth.context(), "/catalogo/12", &config.guard, &mut Vec::new())
        .await
        .unwrap();
    assert_eq!(outcome, access::VisitOutcome::Public);

    let err = access::visit(&auth.context(), "/no-existe", &config.guard, &mut Vec::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no route"));
}

#[tokio::test]
async fn corrupt_session_file_means_anonymous() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    std::fs::create_dir_all(config.session_file.parent().unwrap()).unwrap();
    std::fs::write(&config.session_file, "{ not json").unwrap();

    let auth = commands::open_service(&config).await.unwrap();
    let mut out = Vec::new();
    assert_eq!(access::menu(&auth.context(), &mut out).unwrap(), 0);
    assert_eq!(text(out), "not signed in\n");
}

#[tokio::test]
async fn space_client_menu_lists_publishing_entries() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let auth = commands::open_service(&config).await.unwrap();
    account::login(&auth, "dueno@viapublica.demo", DEMO_PASSWORD, &mut Vec::new())
        .await
        .unwrap();

    let mut out = Vec::new();
    access::menu(&auth.context(), &mut out).unwrap();
    let out = text(out);
    assert!(out.contains("/mis-espacios"));
    assert!(out.contains("/consultas-recibidas"));
    assert!(!out.contains("/admin"));
}

#[tokio::test]
async fn registration_needs_verification_before_login() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let auth = commands::open_service(&config).await.unwrap();

    let args = account::RegisterArgs {
        name: "Agencia Norte".into(),
        email: "norte@example.com".into(),
        password: "Norte@2024".into(),
        confirm: None,
        role: "cliente".into(),
        client_kind: Some("agencia".into()),
        phone: None,
        verify: false,
    };
    account::register(&auth, args.clone(), &mut Vec::new()).await.unwrap();
    assert!(auth.context().current_session().is_none());

    let err = account::login(&auth, "norte@example.com", "Norte@2024", &mut Vec::new())
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("email not verified"));

    let verified = account::RegisterArgs {
        email: "sur@example.com".into(),
        verify: true,
        ..args
    };
    account::register(&auth, verified, &mut Vec::new()).await.unwrap();
    account::login(&auth, "sur@example.com", "Norte@2024", &mut Vec::new())
        .await
        .unwrap();
    let mut out = Vec::new();
    account::whoami(&auth, &mut out).unwrap();
    let report: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(report["permissions"]["canPublishBillboards"], true);
    assert_eq!(report["permissions"]["canAccessAdminPanel"], false);
}

#[test]
fn matrix_json_has_one_record_per_role() {
    let mut out = Vec::new();
    matrix::run(matrix::MatrixFormat::Json, &mut out).unwrap();
    let records: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(records["standard_user"]["canSaveFavorites"], true);
    assert_eq!(records["standard_user"]["canPublishBillboards"], false);
    assert_eq!(records["administrator"]["canViewGlobalMetrics"], true);
}

#[test]
fn check_accepts_legacy_names() {
    let mut out = Vec::new();
    assert!(matrix::check("cliente", "canDefinePricing", &mut out).unwrap());
    assert!(!matrix::check("usuario", "manage-roles", &mut out).unwrap());
    assert!(matrix::check("usuario", "canFly", &mut out).is_err());
    assert_eq!(
        text(out),
        "cliente has canDefinePricing\nusuario lacks manage-roles\n"
    );
}
