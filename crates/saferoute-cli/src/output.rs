//! Output formatting for the CLI.

use clap::ValueEnum;
use serde::Serialize;
use session_controller::{route_for, AppRoute, SessionSnapshot};

/// Output format.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Serialize)]
struct SessionView<'a> {
    route: AppRoute,
    #[serde(flatten)]
    snapshot: &'a SessionSnapshot,
}

fn route_label(route: AppRoute) -> &'static str {
    match route {
        AppRoute::Loading => "loading",
        AppRoute::App => "app",
        AppRoute::ProfileForm => "profile form",
        AppRoute::Onboarding {
            show_carousel: true,
        } => "onboarding (carousel)",
        AppRoute::Onboarding {
            show_carousel: false,
        } => "onboarding (login)",
    }
}

/// Print a session snapshot with the screen it routes to.
pub fn print_session(snapshot: &SessionSnapshot, format: OutputFormat) {
    let route = route_for(snapshot);
    match format {
        OutputFormat::Text => {
            print_row("State", &format!("{:?}", snapshot.state));
            print_row("Route", route_label(route));
            print_row("Carousel seen", &snapshot.has_seen_carousel.to_string());
            if let Some(user) = &snapshot.user {
                print_row("User ID", user.id());
                print_row("Email", user.email());
                if let Some(name) = user.full_name() {
                    print_row("Full name", name);
                }
                if !user.profile.emergency_contacts.is_empty() {
                    print_row(
                        "Contacts",
                        &user.profile.emergency_contacts.len().to_string(),
                    );
                }
            }
        }
        OutputFormat::Json => print_json(&SessionView { route, snapshot }),
    }
}

/// Print only the route.
pub fn print_route(snapshot: &SessionSnapshot, format: OutputFormat) {
    let route = route_for(snapshot);
    match format {
        OutputFormat::Text => println!("{}", route_label(route)),
        OutputFormat::Json => print_json(&route),
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: failed to encode output: {}", e),
    }
}

/// Print a success message.
pub fn print_success(message: &str, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", message),
        OutputFormat::Json => print_json(&serde_json::json!({
            "status": "success",
            "message": message,
        })),
    }
}

/// Print a table row.
pub fn print_row(label: &str, value: &str) {
    println!("  {:<16} {}", format!("{}:", label), value);
}

/// Print a heading.
pub fn print_heading(text: &str) {
    println!("\n{}", text);
    println!("{}", "-".repeat(50));
}
