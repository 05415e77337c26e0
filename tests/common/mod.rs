use std::net::SocketAddr;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use hostdeck::auth::jwt::{encode_token, Claims};
use hostdeck::config::Config;

pub const JWT_SECRET: &str = "test-jwt-secret-that-is-long-enough";

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
}

/// Ids of one fully-populated catalog plus a project to deploy into.
#[allow(dead_code)]
pub struct Fixture {
    pub token: String,
    pub user_id: String,
    pub project_id: String,
    pub framework_id: String,
    pub service_plan_id: String,
    pub database_plan_id: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Mirror a user from the identity provider and mint a token for them.
    pub async fn login_as(&self, email: &str) -> (String, String) {
        let user = hostdeck::db::users::create(&self.pool, email, "Test User")
            .await
            .expect("create user failed");
        let claims = Claims::new(user.public_id, chrono::Duration::minutes(15));
        let token = encode_token(&claims, JWT_SECRET).expect("encode token failed");
        (token, user.public_id.to_string())
    }

    /// Create an admin record and return its JSON, asserting 201.
    pub async fn create_record(&self, token: &str, path: &str, body: &Value) -> Value {
        let (created, status) = self.post_auth(path, token, body).await;
        assert_eq!(status, StatusCode::CREATED, "create {path} failed: {created}");
        created
    }

    /// Seed a project plus one framework, service plan and database plan.
    pub async fn fixture(&self) -> Fixture {
        let (token, user_id) = self.login_as("admin@test.com").await;

        let project = self
            .create_record(
                &token,
                "/api/v1/admin/projects",
                &json!({ "name": "Main", "owner_id": user_id }),
            )
            .await;
        let framework = self
            .create_record(&token, "/api/v1/admin/frameworks", &json!({ "name": "Django" }))
            .await;
        let service = self
            .create_record(&token, "/api/v1/admin/external-services", &json!({ "name": "Compute" }))
            .await;
        let service_plan = self
            .create_record(
                &token,
                "/api/v1/admin/external-service-plan-types",
                &plan_body("external_service_id", service["public_id"].as_str().unwrap(), "Small"),
            )
            .await;
        let database_type = self
            .create_record(&token, "/api/v1/admin/database-types", &json!({ "name": "Postgres" }))
            .await;
        let database_plan = self
            .create_record(
                &token,
                "/api/v1/admin/database-plan-types",
                &plan_body("database_type_id", database_type["public_id"].as_str().unwrap(), "Hobby"),
            )
            .await;

        Fixture {
            token,
            user_id,
            project_id: project["public_id"].as_str().unwrap().to_string(),
            framework_id: framework["public_id"].as_str().unwrap().to_string(),
            service_plan_id: service_plan["public_id"].as_str().unwrap().to_string(),
            database_plan_id: database_plan["public_id"].as_str().unwrap().to_string(),
        }
    }

    /// POST /deploy-app with the fixture's references, return (body, status).
    pub async fn deploy(&self, fx: &Fixture, name: &str, env: Value) -> (Value, StatusCode) {
        self.post_auth(
            "/deploy-app",
            &fx.token,
            &json!({
                "name": name,
                "project_id": fx.project_id,
                "framework_id": fx.framework_id,
                "external_service_plan_type_id": fx.service_plan_id,
                "database_plan_type_id": fx.database_plan_id,
                "environment_variables": env,
            }),
        )
        .await
    }

    pub async fn count(&self, sql: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(sql)
            .fetch_one(&self.pool)
            .await
            .expect("count query failed")
    }

    /// Make an authenticated GET request.
    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated POST request with JSON body.
    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated PUT request with JSON body.
    pub async fn put_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("put request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated DELETE request.
    pub async fn delete_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

pub fn plan_body(parent_field: &str, parent_id: &str, name: &str) -> Value {
    json!({
        parent_field: parent_id,
        "name": name,
        "storage": 10,
        "bandwidth": 100,
        "memory": 0.5,
        "cpu": 1,
        "monthly_cost": 5.0,
        "per_hour_cost": 0.007,
    })
}

/// Spawn a test app with a fresh temporary database.
pub async fn spawn_app() -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let db_name = format!("hostdeck_test_{}", Uuid::now_v7().to_string().replace('-', ""));

    // Connect to default postgres DB to create test DB
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let config = Config {
        database_url: test_url,
        jwt_secret: JWT_SECRET.to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        max_body_size: 1_048_576,
        db_max_connections: 5,
        log_level: "warn".to_string(),
    };

    let app = hostdeck::build_app(pool.clone(), config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder().build().unwrap();

    TestApp {
        addr,
        pool,
        client,
        db_name,
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
