use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

pub struct InputWidget<'a> {
    label: &'a str,
    value: &'a str,
    placeholder: Option<&'a str>,
    focused: bool,
}

impl<'a> InputWidget<'a> {
    pub fn new(label: &'a str, value: &'a str) -> Self {
        Self {
            label,
            value,
            placeholder: None,
            focused: false,
        }
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl Widget for InputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Theme::border_focused()
        } else {
            Theme::border()
        };

        let block = Block::default()
            .title(self.label)
            .borders(Borders::ALL)
            .border_style(border_style);

        let inner = block.inner(area);
        block.render(area, buf);

        if self.focused {
            // Block cursor rides at the end of the entered text
            let display_value = Line::from(vec![
                Span::raw(self.value),
                Span::styled(" ", Theme::selected()),
            ]);

            let para = Paragraph::new(display_value);
            para.render(inner, buf);
        } else if self.value.is_empty() {
            if let Some(placeholder) = self.placeholder {
                let para = Paragraph::new(Span::styled(placeholder, Theme::dim()));
                para.render(inner, buf);
            }
        } else {
            let para = Paragraph::new(self.value);
            para.render(inner, buf);
        }
    }
}

pub struct SelectWidget<'a> {
    label: &'a str,
    options: &'a [&'a str],
    selected: usize,
    focused: bool,
}

impl<'a> SelectWidget<'a> {
    pub fn new(label: &'a str, options: &'a [&'a str], selected: usize) -> Self {
        Self {
            label,
            options,
            selected,
            focused: false,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl Widget for SelectWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Theme::border_focused()
        } else {
            Theme::border()
        };

        let block = Block::default()
            .title(self.label)
            .borders(Borders::ALL)
            .border_style(border_style);

        let inner = block.inner(area);
        block.render(area, buf);

        let value = self.options.get(self.selected).unwrap_or(&"");

        if self.focused {
            let line = Line::from(vec![
                Span::styled(format!("< {} >", value), Theme::highlight()),
                Span::styled(
                    format!(" {}/{}", self.selected + 1, self.options.len()),
                    Theme::dim(),
                ),
            ]);
            Paragraph::new(line).render(inner, buf);
        } else {
            Paragraph::new(Span::styled(value.to_string(), Theme::normal())).render(inner, buf);
        }
    }
}
