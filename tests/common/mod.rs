//! Common test utilities for integration tests

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Helper function to create a test ZIP file with specified files
#[allow(dead_code)]
pub fn create_test_zip(
    zip_path: &Path,
    files: &[(&str, &str)],
) -> Result<(), Box<dyn std::error::Error>> {
    use zip::write::FileOptions;
    use zip::ZipWriter;

    let file = fs::File::create(zip_path)?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, content) in files {
        zip.start_file(*name, options)?;
        zip.write_all(content.as_bytes())?;
    }

    zip.finish()?;
    Ok(())
}

/// Helper function to create a text file in a directory
#[allow(dead_code)]
pub fn create_text_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::File::create(&path)
        .unwrap()
        .write_all(content.as_bytes())
        .unwrap();
    path
}

/// Workbook written the way a desktop spreadsheet app does: only rows with
/// content (plus one formatted blank row), built-in date format 14.
#[allow(dead_code)]
pub fn create_excel_fixture(dir: &Path) -> PathBuf {
    let path = dir.join("sheet-via-excel.xlsx");
    create_test_zip(
        &path,
        &[
            ("[Content_Types].xml", CONTENT_TYPES),
            ("xl/workbook.xml", EXCEL_WORKBOOK),
            ("xl/_rels/workbook.xml.rels", EXCEL_RELS),
            ("xl/sharedStrings.xml", SHARED_STRINGS),
            ("xl/styles.xml", EXCEL_STYLES),
            ("xl/worksheets/sheet1.xml", EXCEL_SHEET),
        ],
    )
    .unwrap();
    path
}

/// Workbook written the way an export tool does: every row present with
/// styled blank cells, absolute relationship targets, a custom date format.
#[allow(dead_code)]
pub fn create_numbers_fixture(dir: &Path) -> PathBuf {
    let path = dir.join("sheet-via-numbers.xlsx");
    create_test_zip(
        &path,
        &[
            ("xl/workbook.xml", NUMBERS_WORKBOOK),
            ("xl/_rels/workbook.xml.rels", NUMBERS_RELS),
            ("xl/sharedStrings.xml", SHARED_STRINGS),
            ("xl/styles.xml", NUMBERS_STYLES),
            ("xl/worksheets/Feuil1.xml", NUMBERS_SHEET),
        ],
    )
    .unwrap();
    path
}

/// The comma, semicolon and tab variants of the same six-record table,
/// with the delimiter each one uses.
#[allow(dead_code)]
pub fn create_text_fixtures(dir: &Path) -> Vec<(PathBuf, char)> {
    vec![
        (create_text_file(dir, "sheet-comma.csv", COMMA_CSV), ','),
        (create_text_file(dir, "sheet-semicolon.csv", SEMICOLON_CSV), ';'),
        (create_text_file(dir, "sheet.tsv", TAB_TSV), '\t'),
    ]
}

#[allow(dead_code)]
pub const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;

#[allow(dead_code)]
pub const SHARED_STRINGS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="5" uniqueCount="4"><si><t>test</t></si><si><t>abc</t></si><si><t>def</t></si><si><t>ghi</t></si></sst>"#;

#[allow(dead_code)]
pub const EXCEL_WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <workbookPr defaultThemeVersion="166925"/>
  <sheets><sheet name="Feuil1" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

#[allow(dead_code)]
pub const EXCEL_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

#[allow(dead_code)]
pub const EXCEL_STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <cellStyleXfs count="1"><xf numFmtId="14" fontId="0"/></cellStyleXfs>
  <cellXfs count="2"><xf numFmtId="0" fontId="0" xfId="0"/><xf numFmtId="14" fontId="0" xfId="0" applyNumberFormat="1"/></cellXfs>
</styleSheet>"#;

#[allow(dead_code)]
pub const EXCEL_SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <dimension ref="B3:E6"/>
  <sheetData>
    <row r="3" spans="2:5"><c r="B3" t="s"><v>0</v></c><c r="C3" t="s"><v>1</v></c><c r="E3" t="s"><v>2</v></c></row>
    <row r="4" spans="2:5"><c r="B4"><v>123</v></c><c r="C4" s="1"><v>44166</v></c></row>
    <row r="5" spans="2:5" ht="15" customHeight="1"/>
    <row r="6" spans="2:5"><c r="B6" t="s"><v>3</v></c><c r="C6"><v>123.456</v></c><c r="E6" t="s"><v>0</v></c></row>
  </sheetData>
</worksheet>"#;

#[allow(dead_code)]
pub const NUMBERS_WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><workbookPr date1904="false"/><sheets><sheet name="Feuil1" sheetId="1" r:id="rId3"/></sheets></workbook>"#;

#[allow(dead_code)]
pub const NUMBERS_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/Feuil1.xml"/></Relationships>"#;

#[allow(dead_code)]
pub const NUMBERS_STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><numFmts count="1"><numFmt numFmtId="164" formatCode="m/d/yy"/></numFmts><cellXfs count="3"><xf numFmtId="0"/><xf numFmtId="0" applyFont="1"/><xf numFmtId="164" applyNumberFormat="1"/></cellXfs></styleSheet>"#;

#[allow(dead_code)]
pub const NUMBERS_SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1" s="1"/><c r="B1" s="1"/><c r="C1" s="1"/><c r="D1" s="1"/><c r="E1" s="1"/></row><row r="2"><c r="A2" s="1"/><c r="B2" s="1"/><c r="C2" s="1"/><c r="D2" s="1"/><c r="E2" s="1"/></row><row r="3"><c r="A3" s="1"/><c r="B3" s="1" t="s"><v>0</v></c><c r="C3" s="1" t="s"><v>1</v></c><c r="D3" s="1"/><c r="E3" s="1" t="s"><v>2</v></c></row><row r="4"><c r="A4" s="1"/><c r="B4" s="1" t="n"><v>123</v></c><c r="C4" s="2"><v>44166</v></c><c r="D4" s="1"/><c r="E4" s="1"/></row><row r="5"><c r="A5" s="1"/><c r="B5" s="1"/><c r="C5" s="1"/><c r="D5" s="1"/><c r="E5" s="1"/></row><row r="6"><c r="A6" s="1"/><c r="B6" s="1" t="s"><v>3</v></c><c r="C6" s="1" t="n"><v>123.456</v></c><c r="D6" s="1"/><c r="E6" s="1" t="s"><v>0</v></c></row></sheetData></worksheet>"#;

#[allow(dead_code)]
pub const COMMA_CSV: &str = ",,,,\n,,,,\n,test,abc,,def\n,123,12/1/20,,\n,,,,\n,ghi,\"123,456\",,test\n";

#[allow(dead_code)]
pub const SEMICOLON_CSV: &str = ";;;;\n;;;;\n;test;abc;;def\n;123;12/1/20;;\n;;;;\n;ghi;123,456;;test\n";

#[allow(dead_code)]
pub const TAB_TSV: &str = "\t\t\t\t\n\t\t\t\t\n\ttest\tabc\t\tdef\n\t123\t12/1/20\t\t\n\t\t\t\t\n\tghi\t\"123,456\"\t\ttest\n";
