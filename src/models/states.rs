//! Canonical US state table.

/// (name, code) for every state plus DC and Puerto Rico, ordered by code
pub const STATES: &[(&str, &str)] = &[
    ("Alaska", "AK"),
    ("Alabama", "AL"),
    ("Arkansas", "AR"),
    ("Arizona", "AZ"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("District of Columbia", "DC"),
    ("Delaware", "DE"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Iowa", "IA"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Massachusetts", "MA"),
    ("Maryland", "MD"),
    ("Maine", "ME"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Missouri", "MO"),
    ("Mississippi", "MS"),
    ("Montana", "MT"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Nebraska", "NE"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("Nevada", "NV"),
    ("New York", "NY"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Puerto Rico", "PR"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Virginia", "VA"),
    ("Vermont", "VT"),
    ("Washington", "WA"),
    ("Wisconsin", "WI"),
    ("West Virginia", "WV"),
    ("Wyoming", "WY"),
];

/// Look up the two-letter code for a state name (case-insensitive)
pub fn state_code(name: &str) -> Option<&'static str> {
    let name = name.trim();
    STATES
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, code)| *code)
}

/// Look up the state name for a two-letter code (case-insensitive)
pub fn state_name(code: &str) -> Option<&'static str> {
    let code = code.trim();
    STATES
        .iter()
        .find(|(_, c)| c.eq_ignore_ascii_case(code))
        .map(|(name, _)| *name)
}
