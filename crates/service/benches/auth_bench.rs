use criterion::{criterion_group, criterion_main, Criterion};

use service::auth::domain::{LoginInput, SignupInput};
use service::auth::{AuthService, TokenKeys};
use service::Stores;

fn bench_login(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let dir = std::env::temp_dir().join(format!("echoes_bench_{}", uuid::Uuid::new_v4()));
    let stores = rt.block_on(Stores::file(&dir)).unwrap();
    let svc = AuthService::new(stores.users.clone(), TokenKeys::new("secret", 1));

    rt.block_on(svc.signup(SignupInput {
        name: "Bench".into(),
        email: "bench@example.com".into(),
        password: "Benchmark1".into(),
    }))
    .unwrap();

    c.bench_function("auth_login_verify", |b| {
        b.iter(|| {
            let session = rt
                .block_on(svc.login(LoginInput { email: "bench@example.com".into(), password: "Benchmark1".into() }))
                .unwrap();
            svc.verify_token(&session.token).unwrap();
        });
    });

    let _ = std::fs::remove_dir_all(&dir);
}

criterion_group!(benches, bench_login);
criterion_main!(benches);
