use utoipa::OpenApi;

pub(crate) const HEALTH_TAG: &str = "Health API";
pub(crate) const DRINKS_TAG: &str = "Drinks API";

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::health::health_check,
        crate::api::health::ready_check,
        crate::api::drinks::list::list_drinks,
        crate::api::drinks::list::list_drinks_detail,
        crate::api::drinks::create::create_drink,
        crate::api::drinks::update::update_drink,
        crate::api::drinks::delete::delete_drink,
    ),
    tags(
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = DRINKS_TAG, description = "Drink menu endpoints, guarded by bearer token permissions"),
    ),
    info(
        title = "Coffee Shop Drinks API",
        description = "Drink menu service with token based permissions",
        version = "1.0.0"
    )
)]
pub(crate) struct ApiDoc;
