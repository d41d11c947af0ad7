use housing_console::{
    assemble_detail, load_dashboard, Action, ConsoleError, GatewayConfig, HttpGateway,
};
use serde_json::json;

const ID: &str = "64f5a53d1234567890abcdef";
const GOOD: &str = "65a0b1c2d3e4f5a6b7c8d9e1";
const BAD: &str = "65a0b1c2d3e4f5a6b7c8d9e2";

async fn mock_json(server: &mut mockito::ServerGuard, path: &str, body: serde_json::Value) -> mockito::Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

#[tokio::test]
async fn detail_keeps_requests_and_reviews_when_an_image_fails() {
    let mut server = mockito::Server::new_async().await;

    let _property = mock_json(
        &mut server,
        &format!("/inmuebles/{}", ID),
        json!({
            "_id": ID,
            "ubicacion": "Av. Reforma 100",
            "precio": 15000,
            "caracteristicas": ["wifi", "parking"],
            "disponible": true,
            "imagenes": [BAD, "not-an-id", GOOD]
        }),
    )
    .await;
    let _good = server
        .mock("GET", format!("/imagenes/{}", GOOD).as_str())
        .with_status(200)
        .with_header("content-type", "image/jpeg")
        .with_body([0xffu8, 0xd8])
        .create_async()
        .await;
    let _bad = server
        .mock("GET", format!("/imagenes/{}", BAD).as_str())
        .with_status(503)
        .create_async()
        .await;
    let _requests = mock_json(
        &mut server,
        &format!("/inmuebles/{}/solicitudes_renta", ID),
        json!([{ "inquilino_id": ID, "estado": "pendiente", "fecha_solicitud": "2024-03-01T10:00:00Z" }]),
    )
    .await;
    let _reviews = mock_json(
        &mut server,
        &format!("/inmuebles/{}/resenas", ID),
        json!([{ "inquilino_id": ID, "calificacion": 5, "comentario": "Excelente" }]),
    )
    .await;

    let gateway = HttpGateway::new(GatewayConfig::new(server.url())).unwrap();
    let aggregate = assemble_detail(&gateway, ID).await.unwrap();

    assert!(aggregate.images_unavailable);
    assert_eq!(aggregate.images.len(), 1);
    assert_eq!(aggregate.images[0].id, GOOD);
    assert_eq!(aggregate.images[0].url, "data:image/jpeg;base64,/9g=");
    assert_eq!(aggregate.rental_requests.len(), 1);
    assert_eq!(aggregate.reviews.len(), 1);
}

#[tokio::test]
async fn detail_fails_as_one_error_when_reviews_fail() {
    let mut server = mockito::Server::new_async().await;

    let _property = mock_json(
        &mut server,
        &format!("/inmuebles/{}", ID),
        json!({ "_id": ID, "ubicacion": "Centro", "precio": 9000, "disponible": false }),
    )
    .await;
    let _requests = mock_json(
        &mut server,
        &format!("/inmuebles/{}/solicitudes_renta", ID),
        json!([]),
    )
    .await;
    let _reviews = server
        .mock("GET", format!("/inmuebles/{}/resenas", ID).as_str())
        .with_status(500)
        .create_async()
        .await;

    let gateway = HttpGateway::new(GatewayConfig::new(server.url())).unwrap();
    let err = assemble_detail(&gateway, ID).await.unwrap_err();

    assert_eq!(err.action, Action::LoadProperty);
    assert!(matches!(err.cause, ConsoleError::Remote { .. }));
}

#[tokio::test]
async fn dashboard_over_http_counts_nested_records() {
    let mut server = mockito::Server::new_async().await;
    let _list = mock_json(
        &mut server,
        "/inmuebles",
        json!([
            {
                "_id": ID, "ubicacion": "Centro", "precio": 9000, "disponible": true,
                "solicitudes_renta": [
                    { "inquilino_id": ID, "estado": "pendiente" },
                    { "inquilino_id": ID, "estado": "aprobada" }
                ],
                "contratos": [{ "inquilino_id": ID, "estado": "activo", "monto_renta": 9000 }]
            },
            { "_id": GOOD, "ubicacion": "Roma", "precio": 12000, "disponible": false }
        ]),
    )
    .await;

    let gateway = HttpGateway::new(GatewayConfig::new(server.url())).unwrap();
    let dashboard = load_dashboard(&gateway).await.unwrap();

    assert_eq!(dashboard.stats.total_properties, 2);
    assert_eq!(dashboard.stats.available_properties, 1);
    assert_eq!(dashboard.stats.active_contracts, 1);
    assert_eq!(dashboard.stats.pending_requests, 1);
    assert_eq!(dashboard.featured.len(), 2);
}
