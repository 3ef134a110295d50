use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;

pub async fn log_req_res(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let start = Instant::now();

    let res = next.run(req).await;

    tracing::info!(
        %method,
        path,
        status = %res.status(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "request"
    );

    res
}
