use super::*;
use crate::locale::Locale;
use crate::router::{Location, Navigation};
use crate::session::AuthToken;

#[tokio::test]
async fn new_context_wires_config_into_stores() {
    let mut config = ClientConfig::new("http://127.0.0.1:9");
    config.locale = Locale::En;
    config.timezone = "Europe/Berlin".into();

    let ctx = AppContext::new(&config).unwrap();

    assert_eq!(ctx.locale.current(), Locale::En);
    assert_eq!(ctx.locale.timezone(), "Europe/Berlin");
    assert!(!ctx.session.is_logged());
    assert!(ctx.notifications.messages().is_empty());
}

#[tokio::test]
async fn clones_share_session_with_guard() {
    let ctx = AppContext::new(&ClientConfig::new("http://127.0.0.1:9")).unwrap();
    let other = ctx.clone();

    assert!(matches!(ctx.guard.before_each(&Location::parse("/clients")), Navigation::Redirect { .. }));

    other.session.set_auth(AuthToken {
        access_token: "a".into(),
        refresh_token: "r".into(),
        expires_in: 60.0,
        authorities: vec![],
    });

    assert_eq!(ctx.guard.before_each(&Location::parse("/clients")), Navigation::Proceed);
}
