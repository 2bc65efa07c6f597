// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

// Helpers shared by the draw functions; included into `tui`.

/// Narrow terminals stack the tree above the detail pane.
fn stack_panes_vertically(area: Rect) -> bool {
    area.width < 100
}

fn tree_title(session: &TraceSession) -> String {
    let tree = session.tree();
    match tree.first_top_level().and_then(|id| tree.get(id)) {
        Some(record) => format!(" {} ", display_name(record)),
        None => " Waiting for trace data ".to_owned(),
    }
}

fn tree_row_line(
    row: &TreeRow,
    record: Option<&CallRecord>,
    focused: bool,
    frame: usize,
) -> Line<'static> {
    let dim = |style: Style| if focused { style } else { style.fg(UNFOCUSED_COLOR) };
    let mut spans = Vec::<Span<'static>>::new();

    spans.push(Span::raw("  ".repeat(row.depth)));
    let caret = match (row.child_count, row.expanded) {
        (0, _) => "  ".to_owned(),
        (_, true) => "▾ ".to_owned(),
        (_, false) => "▸ ".to_owned(),
    };
    spans.push(Span::styled(caret, dim(Style::default())));
    if row.child_count > 0 {
        spans.push(Span::styled(
            format!("{} ", row.child_count),
            dim(Style::default().fg(FOOTER_LABEL_COLOR)),
        ));
    }

    let Some(record) = record else {
        spans.push(Span::styled(row.id.to_string(), dim(Style::default().fg(UNFOCUSED_COLOR))));
        return Line::from(spans);
    };

    spans.push(Span::styled(
        display_name(record),
        dim(Style::default().add_modifier(Modifier::BOLD)),
    ));
    if is_model_call(record.name()) {
        spans.push(Span::raw(format!(" {MODEL_CALL_MARKER}")));
    }
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        short_summary(Some(record.args())),
        dim(Style::default().fg(ARGS_COLOR)),
    ));
    spans.push(Span::styled(" → ", dim(Style::default())));
    match record.result() {
        Some(result) => spans.push(Span::styled(
            short_summary(Some(result)),
            dim(Style::default().fg(RESULT_COLOR)),
        )),
        None => spans.push(Span::styled(
            SPINNER_FRAMES[frame % SPINNER_FRAMES.len()],
            dim(Style::default().fg(FOOTER_KEY_COLOR)),
        )),
    }
    Line::from(spans)
}

fn detail_title(tab: DetailTab) -> Line<'static> {
    let style_for = |active: bool| {
        if active {
            Style::default().fg(SELECTED_COLOR).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(FOOTER_LABEL_COLOR)
        }
    };
    Line::from(vec![
        Span::raw(" "),
        Span::styled("Inputs and Outputs", style_for(tab == DetailTab::InputsOutputs)),
        Span::raw(" | "),
        Span::styled("Source", style_for(tab == DetailTab::Source)),
        Span::raw(" "),
    ])
}

fn detail_lines(session: &TraceSession, tab: DetailTab) -> Vec<Line<'static>> {
    let Some((id, record)) = session.selected_record() else {
        return vec![Line::styled("No call selected", Style::default().fg(UNFOCUSED_COLOR))];
    };

    let mut lines = vec![Line::styled(
        display_name(record),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    lines.push(Line::styled(id.to_string(), Style::default().fg(UNFOCUSED_COLOR)));
    if !record.doc().is_empty() {
        lines.push(Line::raw(""));
        lines.extend(text_lines(record.doc(), Style::default().add_modifier(Modifier::ITALIC)));
    }
    lines.push(Line::raw(""));

    match tab {
        DetailTab::InputsOutputs => {
            push_section(&mut lines, "Inputs", ARGS_COLOR);
            lines.extend(text_lines(&pretty_json(record.args()), Style::default()));
            let mut records = record.records().peekable();
            if records.peek().is_some() {
                lines.push(Line::raw(""));
                push_section(&mut lines, "Records", FOOTER_KEY_COLOR);
                for (record_id, value) in records {
                    let label = Style::default().fg(FOOTER_LABEL_COLOR);
                    lines.push(Line::styled(record_id.to_string(), label));
                    lines.extend(text_lines(&pretty_json(value), Style::default()));
                }
            }
            lines.push(Line::raw(""));
            push_section(&mut lines, "Outputs", RESULT_COLOR);
            match record.result() {
                Some(result) => lines.extend(text_lines(&pretty_json(result), Style::default())),
                None => {
                    let pending = Style::default().fg(UNFOCUSED_COLOR);
                    lines.push(Line::styled("Still running…", pending));
                }
            }
        }
        DetailTab::Source => match record.source() {
            Some(source) if !source.trim().is_empty() => {
                lines.extend(text_lines(&strip_indent(source), Style::default()));
            }
            _ => lines.push(Line::styled(
                "Source code not available",
                Style::default().fg(UNFOCUSED_COLOR),
            )),
        },
    }
    lines
}

fn push_section(lines: &mut Vec<Line<'static>>, title: &str, color: Color) {
    let style = Style::default().fg(color).add_modifier(Modifier::BOLD);
    lines.push(Line::styled(title.to_owned(), style));
}

fn text_lines(text: &str, style: Style) -> impl Iterator<Item = Line<'static>> + '_ {
    text.split('\n').map(move |line| Line::styled(line.to_owned(), style))
}

fn status_line(session: &TraceSession) -> Line<'static> {
    let status = session.status();
    let mut spans = Vec::<Span<'static>>::new();
    push_footer_entry(&mut spans, "TRACE", session.trace_id().as_str());

    let mut offset = itoa::Buffer::new();
    let mut remote = itoa::Buffer::new();
    let progress = format!("{}/{}", offset.format(status.offset), remote.format(status.remote_len));
    push_footer_entry(&mut spans, "BYTES", &progress);
    push_footer_entry(&mut spans, "CALLS", itoa::Buffer::new().format(session.tree().len() - 1));

    if status.is_stalled() {
        spans.push(Span::styled(" | ", Style::default().fg(FOOTER_LABEL_COLOR)));
        let reason = status.last_error.as_deref().unwrap_or("fetch failed");
        spans.push(Span::styled(
            format!("stalled ({}x): {reason}", status.consecutive_failures),
            Style::default().fg(STALLED_COLOR).add_modifier(Modifier::BOLD),
        ));
    }

    push_footer_entry(&mut spans, "MOVE", "←↓↑→ hjkl");
    push_footer_entry(&mut spans, "VIEW", "Tab");
    push_footer_entry(&mut spans, "QUIT", "q");
    Line::from(spans)
}

fn push_footer_entry(spans: &mut Vec<Span<'static>>, label: &str, value: &str) {
    if !spans.is_empty() {
        spans.push(Span::styled(" | ", Style::default().fg(FOOTER_LABEL_COLOR)));
    }
    spans.push(Span::styled(
        format!("{}:", footer_label_ucfirst(label)),
        Style::default().fg(FOOTER_LABEL_COLOR),
    ));
    spans.push(Span::styled(
        value.to_owned(),
        Style::default().fg(FOOTER_KEY_COLOR).add_modifier(Modifier::BOLD),
    ));
}

fn footer_label_ucfirst(label: &str) -> String {
    let lower = label.to_lowercase();
    let mut chars = lower.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut out = first.to_uppercase().collect::<String>();
    out.push_str(chars.as_str());
    out
}
