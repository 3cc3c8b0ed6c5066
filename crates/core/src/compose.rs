//! Reply composition: one fixed template per outcome kind. Nothing here
//! invents content — an empty ranked list always yields an explicit
//! nothing-found reply naming the filters that were active.

use crate::models::{FilterSet, Outcome, OutcomeKind, RankedPlace};

/// One listing line: `"{index}. {name} ({category}) - {distance} km away"`.
pub fn place_line(index: usize, ranked: &RankedPlace) -> String {
    format!(
        "{}. {} ({}) - {:.2} km away",
        index,
        ranked.place.name,
        ranked.place.category_label(),
        ranked.distance_km
    )
}

fn listing_body(intro: &str, places: &[RankedPlace], outro: Option<&str>) -> String {
    let mut reply = String::from(intro);
    reply.push('\n');
    for (index, ranked) in places.iter().enumerate() {
        reply.push_str(&place_line(index + 1, ranked));
        reply.push('\n');
    }
    if let Some(outro) = outro {
        reply.push_str(outro);
    }
    reply
}

fn describe_filters(filters: &FilterSet) -> String {
    let mut parts = Vec::new();
    if let Some(hours) = filters.hours {
        parts.push(format!("time budget {} hour(s)", hours));
    }
    if let Some(distance) = filters.max_distance_km {
        parts.push(format!("within {} km", distance));
    }
    parts.join(", ")
}

pub fn empty_message() -> Outcome {
    Outcome::client_error(OutcomeKind::ValidationError, "Please send a message.")
}

pub fn location_request() -> Outcome {
    Outcome::reply_only(
        OutcomeKind::LocationRequest,
        "Please share your location (latitude and longitude) to find nearby places.",
    )
}

pub fn validation_error(reason: &str) -> Outcome {
    Outcome::client_error(OutcomeKind::ValidationError, reason)
}

pub fn nearest_places(places: Vec<RankedPlace>) -> Outcome {
    if places.is_empty() {
        return Outcome::listing(
            OutcomeKind::NearestPlaces,
            "Sorry, I couldn't find any nearby places right now.",
            places,
        );
    }

    let reply = listing_body(
        "Here are some nearby places you can visit:",
        &places,
        Some("What kind of activity are you interested in? Food, adventure, relaxation?"),
    );
    Outcome::listing(OutcomeKind::NearestPlaces, reply, places)
}

pub fn category_places(category: &str, places: Vec<RankedPlace>) -> Outcome {
    if places.is_empty() {
        return Outcome::listing(
            OutcomeKind::CategoryPlaces,
            format!(
                "Sorry, I couldn't find any {} places near you. Try another category or a wider search.",
                category
            ),
            places,
        );
    }

    let reply = listing_body(
        &format!("Here are some {} options near you:", category),
        &places,
        None,
    );
    Outcome::listing(OutcomeKind::CategoryPlaces, reply, places)
}

pub fn mood_places(mood: &str, category: &str, places: Vec<RankedPlace>) -> Outcome {
    if places.is_empty() {
        return Outcome::listing(
            OutcomeKind::MoodPlaces,
            format!(
                "Sorry, nothing {} came up nearby ({} places). Try another mood or a wider search.",
                mood, category
            ),
            places,
        );
    }

    let reply = listing_body(
        &format!("Feeling {}? These {} spots should fit:", mood, category),
        &places,
        None,
    );
    Outcome::listing(OutcomeKind::MoodPlaces, reply, places)
}

/// Listing outcome for numeric-filter queries. The kind depends on which
/// filters were set; callers only reach this with at least one filter.
pub fn filtered_places(filters: &FilterSet, places: Vec<RankedPlace>) -> Outcome {
    let kind = match (filters.hours, filters.max_distance_km) {
        (Some(_), Some(_)) => OutcomeKind::MultiFilterPlaces,
        (Some(_), None) => OutcomeKind::TimeBasedPlaces,
        _ => OutcomeKind::DistanceBasedPlaces,
    };

    if places.is_empty() {
        return Outcome::listing(
            kind,
            format!(
                "Nothing matched these filters ({}). Try broadening the time budget or the distance.",
                describe_filters(filters)
            ),
            places,
        );
    }

    let intro = match kind {
        OutcomeKind::MultiFilterPlaces => format!(
            "Here is what fits your {}:",
            describe_filters(filters)
        ),
        OutcomeKind::TimeBasedPlaces => format!(
            "With a {} you could visit:",
            describe_filters(filters)
        ),
        _ => format!("Here is what is {} of you:", describe_filters(filters)),
    };
    let reply = listing_body(&intro, &places, None);
    Outcome::listing(kind, reply, places)
}

pub fn open_hours_stub() -> Outcome {
    Outcome::reply_only(
        OutcomeKind::OpenHoursStub,
        "I can't check live opening hours yet. Most attractions are open during \
         the day; please confirm on the venue's official page.",
    )
}

pub fn travel_mode_stub() -> Outcome {
    Outcome::reply_only(
        OutcomeKind::TravelModeStub,
        "I can't plan routes or travel times yet. The distances I show are \
         straight-line kilometers to help you judge what's close.",
    )
}

pub fn faq_answer(answer: &str) -> Outcome {
    Outcome::reply_only(OutcomeKind::FaqAnswer, answer)
}

pub fn fallback() -> Outcome {
    Outcome::reply_only(
        OutcomeKind::Fallback,
        "Sorry, I couldn't understand your question. You can ask me about nearby \
         places, a category like parks or museums, or common questions about the service.",
    )
}

pub fn internal_error() -> Outcome {
    Outcome::server_error(
        OutcomeKind::InternalError,
        "Sorry, something went wrong on our side. Please try again in a moment.",
    )
}
