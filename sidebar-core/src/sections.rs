use crate::host::HostDocument;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionReport {
    pub headers: usize,
    pub hidden: usize,
}

/// Hides section headers ("Today", "Last 7 days", ...) whose rows were all
/// filtered out.
///
/// A header's span is every following sibling up to the next header. A
/// sibling is either a row itself or a wrapper holding rows.
#[derive(Debug, Default, Clone, Copy)]
pub struct SectionReconciler;

impl SectionReconciler {
    pub fn reconcile<D: HostDocument>(&self, doc: &D) -> SectionReport {
        let headers = doc.headers();
        let mut report = SectionReport {
            headers: headers.len(),
            hidden: 0,
        };
        if headers.is_empty() || doc.rows().is_empty() {
            return report;
        }
        for header in &headers {
            let visible = Self::visible_rows_in_span(doc, header);
            let hide = visible == 0;
            doc.set_hidden(header, hide);
            if hide {
                report.hidden += 1;
            }
        }
        report
    }

    fn visible_rows_in_span<D: HostDocument>(doc: &D, header: &D::Node) -> usize {
        let mut visible = 0;
        let mut cursor = doc.next_sibling(header);
        while let Some(node) = cursor {
            if doc.is_header(&node) {
                break;
            }
            if doc.is_row(&node) {
                if !doc.is_hidden(&node) {
                    visible += 1;
                }
            } else {
                visible += doc
                    .rows_within(&node)
                    .iter()
                    .filter(|row| !doc.is_hidden(row))
                    .count();
            }
            cursor = doc.next_sibling(&node);
        }
        visible
    }
}
