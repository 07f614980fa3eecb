use actix_web::{HttpResponse, Responder, routes};

/// Routes served by the API, as `(path, methods)`.
pub const ROUTES: &[(&str, &str)] = &[
    ("/", "GET"),
    ("/index", "GET"),
    ("/health_check", "GET"),
    ("/metrics", "GET"),
    ("/api/{kind}", "POST"),
    ("/api/get_results/{job_id}", "GET"),
    ("/api/jobs", "GET"),
    ("/api/num_jobs", "GET"),
    ("/api/graceful_shutdown", "GET"),
];

/// Lists the routes served by the API.
#[routes]
#[get("/")]
#[get("/index")]
pub async fn index() -> impl Responder {
    let mut body = String::from(
        "Hello, World!\n Interact with the webserver using one of the defined routes:\n",
    );
    for (path, methods) in ROUTES {
        body.push_str(&format!("<p>Endpoint: \"{path}\" Methods: \"{methods}\"</p>"));
    }

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}
