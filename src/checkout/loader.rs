// ABOUTME: Pickup location pre-selection for the checkout wizard
// Decides which location, if any, is chosen automatically once locations arrive

use super::state::ExistingOrder;
use crate::api::Location;

/// Location to pre-select after a successful load.
///
/// In edit mode the order's stored pickup address wins when it matches a
/// loaded location. Otherwise a business with a single location gets that one.
pub fn preselect(locations: &[Location], existing_order: Option<&ExistingOrder>) -> Option<String> {
    if let Some(order) = existing_order {
        if let Some(found) = locations
            .iter()
            .find(|l| address_matches(l, &order.pickup_street_address, &order.pickup_city))
        {
            return Some(found.id.clone());
        }
    }

    match locations {
        [only] => Some(only.id.clone()),
        _ => None,
    }
}

/// Street and city equality, ignoring surrounding whitespace and ASCII case
fn address_matches(location: &Location, street_address: &str, city: &str) -> bool {
    let street_address = street_address.trim();
    let city = city.trim();
    if street_address.is_empty() || city.is_empty() {
        return false;
    }

    location.street_address.trim().eq_ignore_ascii_case(street_address)
        && location.city.trim().eq_ignore_ascii_case(city)
}
