// Archive parts
pub const WORKBOOK_PART: &str = "xl/workbook.xml";
pub const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
pub const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
pub const STYLES_PART: &str = "xl/styles.xml";

// Reader selection
pub const XLSX_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xltx", "xltm"];
pub const TSV_EXTENSION: &str = "tsv";
pub const CSV_EXTENSION: &str = "csv";

// Text dialect defaults
pub const DEFAULT_DELIMITER: char = ',';
pub const DEFAULT_ENCLOSURE: char = '"';
pub const DEFAULT_ESCAPE: char = '\\';

/// Built-in number formats, keyed by `numFmtId`.
pub const BUILTIN_NUMBER_FORMATS: &[(u32, &str)] = &[
    (0, "General"),
    (1, "0"),
    (2, "0.00"),
    (3, "#,##0"),
    (4, "#,##0.00"),
    (9, "0%"),
    (10, "0.00%"),
    (11, "0.00E+00"),
    (12, "# ?/?"),
    (13, "# ??/??"),
    (14, "mm-dd-yy"),
    (15, "d-mmm-yy"),
    (16, "d-mmm"),
    (17, "mmm-yy"),
    (18, "h:mm AM/PM"),
    (19, "h:mm:ss AM/PM"),
    (20, "h:mm"),
    (21, "h:mm:ss"),
    (22, "m/d/yy h:mm"),
    (37, "#,##0 ;(#,##0)"),
    (38, "#,##0 ;[Red](#,##0)"),
    (39, "#,##0.00;(#,##0.00)"),
    (40, "#,##0.00;[Red](#,##0.00)"),
    (45, "mm:ss"),
    (46, "[h]:mm:ss"),
    (47, "mmss.0"),
    (48, "##0.0E+0"),
    (49, "@"),
];

/// Tokens whose presence in a cleaned format code marks it as a date/time format.
pub const DATE_TIME_TOKENS: &[&str] = &["e", "d", "h", "m", "s", "yy"];

// Date serials
pub const SECONDS_PER_DAY: f64 = 86400.0;
/// Serial of 1970-01-01 in the 1900 date system
pub const UNIX_EPOCH_SERIAL: i64 = 25569;
/// Days between the 1900 and 1904 date systems
pub const DATE_1904_OFFSET_DAYS: i64 = 1462;
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
