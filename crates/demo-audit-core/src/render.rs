// SPDX-License-Identifier: Apache-2.0

use demo_audit_model::OrchestrationReport;
use serde::Serialize;

use crate::Catalog;

const SECTION_RULE: usize = 60;
const SUMMARY_RULE: usize = 80;

pub fn render_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|err| err.to_string())
}

pub fn section_header(title: &str) -> String {
    let rule = "=".repeat(SECTION_RULE);
    format!("\n{rule}\n🧪 Running {title}\n{rule}\n")
}

/// Full text of an orchestrated run: each suite's captured output, then the consolidated summary.
pub fn render_orchestration(catalog: &Catalog, report: &OrchestrationReport) -> String {
    let rule = "=".repeat(SUMMARY_RULE);
    let mut out = String::new();
    out.push_str(&format!("🚀 {}\n{rule}\n", catalog.title));
    for outcome in &report.suites {
        out.push_str(&section_header(&outcome.title));
        out.push_str(&outcome.output);
        if !outcome.output.ends_with('\n') {
            out.push('\n');
        }
    }

    out.push_str(&format!(
        "\n{rule}\n📊 COMPREHENSIVE TEST RESULTS SUMMARY\n{rule}\n"
    ));
    for outcome in &report.suites {
        let status = if outcome.passed {
            "✅ PASSED"
        } else {
            "❌ FAILED"
        };
        out.push_str(&format!("{status} - {}\n", outcome.title));
    }
    out.push_str(&format!(
        "\n🎯 Overall Results: {}/{} test suites passed\n",
        report.passed, report.total
    ));

    if report.all_passed() {
        out.push_str("\n🎉 ALL TESTS PASSED! Demo mode implementation is ready.\n");
        if !catalog.findings.is_empty() {
            out.push_str("\n✅ Key Findings:\n");
            for line in &catalog.findings {
                out.push_str(&format!("  • {line}\n"));
            }
        }
        if !catalog.features.is_empty() {
            out.push_str("\n🔧 Demo Mode Features Verified:\n");
            for line in &catalog.features {
                out.push_str(&format!("  • {line}\n"));
            }
        }
    } else {
        out.push_str(&format!(
            "\n❌ {} test suite(s) failed.\n",
            report.total - report.passed
        ));
        out.push_str("Please review the detailed output above for specific issues.\n");
    }
    out
}
