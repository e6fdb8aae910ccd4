use crate::terminal::Terminal;
use crossterm::style::Color;

/// Key reference shown by `?` in the grow view
pub const GROW_HELP: &str = "\
pixelbonsai

space  start / pause
s      skip phase
r      reset phase
m      toggle reduced motion
w      toggle snow
?      close help
q      quit";

/// Draw a centered help box over whatever is already in the buffer
pub fn render_help_overlay(term: &mut Terminal, help_text: &str) {
    if help_text.is_empty() {
        return;
    }
    let (width, height) = term.size();

    let lines: Vec<&str> = help_text.lines().collect();
    let max_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_width = max_width + 4;
    let box_height = lines.len() + 2;

    let start_x = (width as usize).saturating_sub(box_width) / 2;
    let start_y = (height as usize).saturating_sub(box_height) / 2;
    let right = start_x + box_width - 1;
    let bottom = start_y + box_height - 1;

    let border = Some(Color::White);
    let text = Some(Color::Grey);

    let edge = |term: &mut Terminal, y: usize, left: char, right_ch: char| {
        term.set(start_x as i32, y as i32, left, border, false);
        for x in start_x + 1..right {
            term.set(x as i32, y as i32, '─', border, false);
        }
        term.set(right as i32, y as i32, right_ch, border, false);
    };

    edge(term, start_y, '┌', '┐');
    for (i, line) in lines.iter().enumerate() {
        let y = (start_y + 1 + i) as i32;
        term.set(start_x as i32, y, '│', border, false);
        let padded = format!(" {:<width$} ", line, width = max_width);
        term.set_str(start_x as i32 + 1, y, &padded, text, i == 0);
        term.set(right as i32, y, '│', border, false);
    }
    edge(term, bottom, '└', '┘');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_is_centered_and_boxed() {
        let mut term = Terminal::headless(40, 20);
        render_help_overlay(&mut term, "ab\nc");
        // 6 wide, 4 tall
        assert_eq!(term.cell(17, 8).map(|c| c.ch), Some('┌'));
        assert_eq!(term.cell(22, 8).map(|c| c.ch), Some('┐'));
        assert_eq!(term.cell(19, 9).map(|c| c.ch), Some('a'));
        assert_eq!(term.cell(17, 11).map(|c| c.ch), Some('└'));
    }

    #[test]
    fn empty_text_draws_nothing() {
        let mut term = Terminal::headless(10, 5);
        render_help_overlay(&mut term, "");
        assert!(term.cell(0, 0).is_some_and(|c| c.ch == ' '));
    }

    #[test]
    fn help_lists_quit_key() {
        assert!(GROW_HELP.lines().any(|l| l.starts_with('q')));
    }
}
