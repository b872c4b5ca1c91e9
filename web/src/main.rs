#[cfg(feature = "native")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::sync::Arc;

    use eldercare_web::catalog::FacilityType;
    use eldercare_web::config::AppConfig;
    use eldercare_web::db::favorites_repository::FavoritesState;
    use eldercare_web::db::repository::{
        FacilityRepository, JsonFacilityRepository, MockFacilityRepository,
    };
    use eldercare_web::db::search_repository::assemble;
    use eldercare_web::db::store::open_store;
    use eldercare_web::filters::FilterCriteria;
    use eldercare_web::map::util::{get_geographic_center, FALLBACK_CENTER};
    use eldercare_web::services::auth::{AuthService, MockAuthService};
    use eldercare_web::utils::auth::SessionManager;
    use tracing::{info, warn};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // Try the parent directory first (running from web/), then the current one
    dotenvy::from_filename("../.env")
        .or_else(|_| dotenvy::dotenv())
        .ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,eldercare_web=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Tracing initialized");

    let config = AppConfig::from_env()?;
    let store = open_store(&config)?;

    let repository: Arc<dyn FacilityRepository> = match &config.dataset_path {
        Some(path) => Arc::new(JsonFacilityRepository::load(path)?),
        None => Arc::new(MockFacilityRepository::new()),
    };
    let auth: Arc<dyn AuthService> = Arc::new(MockAuthService::from_config(&config)?);

    let session = SessionManager::new(Arc::clone(&store), auth);
    match session.current_user() {
        Some(user) => info!("Signed in as {} <{}>", user.username, user.email),
        None => info!("Browsing anonymously"),
    }

    let favorites = FavoritesState::new(Arc::clone(&store));
    info!("{} saved favorites", favorites.len());

    let facility_type = match config.facility_type.as_deref() {
        Some(raw) => match raw.parse::<FacilityType>() {
            Ok(kind) => Some(kind),
            Err(e) => {
                warn!("Ignoring FACILITY_TYPE: {}", e);
                None
            }
        },
        None => None,
    };

    let dataset = repository.list_facilities().await?;
    let listing = assemble(
        &dataset,
        facility_type.map(FacilityType::label),
        config.search.as_deref().unwrap_or_default(),
        &FilterCriteria::new(),
    );

    for facility in &listing.facilities {
        let saved = if favorites.is_favorite(facility.id) { " *" } else { "" };
        info!(
            "[{}] {} | {} | {}{}",
            facility.id,
            facility.title,
            facility.location,
            facility.price,
            saved
        );
    }

    let center = get_geographic_center(&listing.markers).unwrap_or(FALLBACK_CENTER);
    info!(
        "{} facilities, map centered on ({:.4}, {:.4}), geographic center ({:.4}, {:.4})",
        listing.len(),
        listing.center.lat,
        listing.center.lng,
        center.lat,
        center.lng
    );

    Ok(())
}

#[cfg(not(feature = "native"))]
fn main() {
    // The binary only exists for native builds
}
