use crate::error::Result;
use crate::models::answer::Answer;
use crate::utils::time::format_timestamp;
use rust_xlsxwriter::*;

pub const CSV_HEADER: [&str; 6] = [
    "ID",
    "ParticipantID",
    "QuestionID",
    "AnswerText",
    "SubmittedAt",
    "IsDraft",
];

pub struct ExportService;

impl ExportService {
    /// Quotes a field when it contains a delimiter, quote or line break,
    /// doubling embedded quotes.
    fn csv_field(value: &str) -> String {
        if value.contains([',', '"', '\n', '\r']) {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }

    pub fn answers_csv(answers: &[Answer]) -> String {
        let mut out = String::with_capacity(64 * (answers.len() + 1));
        out.push_str(&CSV_HEADER.join(","));
        out.push_str("\r\n");
        for a in answers {
            let row = [
                a.id.to_string(),
                a.participant_id.to_string(),
                a.question_id.to_string(),
                Self::csv_field(&a.answer_text),
                format_timestamp(a.submitted_at),
                a.is_draft.to_string(),
            ];
            out.push_str(&row.join(","));
            out.push_str("\r\n");
        }
        out
    }

    /// Styled workbook with the same columns as the CSV export.
    pub fn answers_xlsx(answers: &[Answer]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Answers")?;

        let primary_color = Color::RGB(0x1E293B);
        let header_bg = Color::RGB(0x0F172A);
        let alt_row_1 = Color::RGB(0xF8FAFC);
        let alt_row_2 = Color::White;
        let border_color = Color::RGB(0xE2E8F0);
        let draft_color = Color::RGB(0xF59E0B);
        let final_color = Color::RGB(0x10B981);

        let widths = [10.0, 16.0, 14.0, 60.0, 22.0, 12.0];
        for (i, width) in widths.iter().enumerate() {
            worksheet.set_column_width(i as u16, *width)?;
        }
        let last_col = (CSV_HEADER.len() - 1) as u16;

        let title_format = Format::new()
            .set_font_size(16)
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(primary_color)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);
        worksheet.set_row_height(0, 36)?;
        worksheet.merge_range(0, 0, 0, last_col, "Exam answers", &title_format)?;

        let subtitle_format = Format::new()
            .set_font_size(10)
            .set_italic()
            .set_font_color(Color::RGB(0x94A3B8))
            .set_background_color(primary_color)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);
        let finals = answers.iter().filter(|a| !a.is_draft).count();
        let subtitle = format!(
            "Exported {} UTC  •  {} answers ({} final, {} draft)",
            format_timestamp(chrono::Utc::now()),
            answers.len(),
            finals,
            answers.len() - finals
        );
        worksheet.merge_range(1, 0, 1, last_col, &subtitle, &subtitle_format)?;

        let header_format = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(Color::White)
            .set_background_color(header_bg)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);
        let header_row = 2;
        worksheet.set_row_height(header_row, 26)?;
        for (i, name) in CSV_HEADER.iter().enumerate() {
            worksheet.write_string_with_format(header_row, i as u16, *name, &header_format)?;
        }

        let data_start_row = 3;
        for (idx, a) in answers.iter().enumerate() {
            let row = data_start_row + idx as u32;
            let bg = if idx % 2 == 0 { alt_row_1 } else { alt_row_2 };
            let base_fmt = Format::new()
                .set_font_size(10)
                .set_background_color(bg)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color);
            let center_fmt = base_fmt.clone().set_align(FormatAlign::Center);
            let wrap_fmt = base_fmt.clone().set_text_wrap();

            worksheet.write_number_with_format(row, 0, a.id as f64, &center_fmt)?;
            worksheet.write_number_with_format(row, 1, a.participant_id as f64, &center_fmt)?;
            worksheet.write_number_with_format(row, 2, a.question_id as f64, &center_fmt)?;
            worksheet.write_string_with_format(row, 3, &a.answer_text, &wrap_fmt)?;
            worksheet.write_string_with_format(row, 4, format_timestamp(a.submitted_at), &center_fmt)?;

            let flag_fmt = Format::new()
                .set_font_size(10)
                .set_bold()
                .set_font_color(Color::White)
                .set_background_color(if a.is_draft { draft_color } else { final_color })
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color);
            worksheet.write_string_with_format(row, 5, a.is_draft.to_string(), &flag_fmt)?;
        }

        worksheet.set_freeze_panes(3, 0)?;
        let last_row = (data_start_row + answers.len() as u32).saturating_sub(1).max(header_row);
        worksheet.autofilter(header_row, 0, last_row, last_col)?;

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }
}
