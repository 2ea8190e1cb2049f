use std::convert::TryFrom;

use crate::config::Config;
use crate::control::{Controller, Gesture, Modifiers};
use crate::events::{Dispatcher, Event};

use super::{Context, Mode, StatusBar, YearWindow};

use unsegen::base::{GraphemeCluster, Terminal};
use unsegen::input::{
    EditBehavior, Input, Key, Navigatable, NavigateBehavior, OperationResult, ScrollBehavior,
};
use unsegen::widget::*;

use super::command::CommandParser;

pub struct App {
    context: Context,
}

impl App {
    pub fn new(config: &Config, controller: Controller) -> App {
        App {
            context: Context::new(config, controller),
        }
    }

    fn bottom_bar<'w>(&'w self) -> impl Widget + 'w {
        let spacer = " ".with_demand(|_| Demand2D {
            width: ColDemand::exact(1),
            height: RowDemand::exact(1),
        });

        let mut layout = HLayout::new()
            .separator(GraphemeCluster::try_from(' ').unwrap())
            .widget(spacer);
        if self.context.mode == Mode::Command {
            layout = layout.widget(self.context.command_line.as_widget());
        }

        layout
    }

    fn as_widget<'w>(&'w self) -> impl Widget + 'w {
        VLayout::new()
            .widget(YearWindow::new(&self.context))
            .widget(StatusBar::new(&self.context))
            .widget(self.bottom_bar())
    }

    fn handle_input(&mut self, input: Input) {
        if input.matches(Key::Esc) {
            self.context.mode = Mode::Normal;
            return;
        }

        match self.context.mode {
            Mode::Normal => {
                let context = &mut self.context;
                input
                    .chain((Key::Char('q'), || context.quit = true))
                    .chain((Key::Char(':'), || context.mode = Mode::Command))
                    .chain((Key::Char('g'), || context.select_today()))
                    .chain((Key::Char(' '), || {
                        context.gesture(Gesture::Primary, Modifiers::default())
                    }))
                    .chain((Key::Char('\n'), || {
                        context.gesture(Gesture::Primary, Modifiers::default())
                    }))
                    .chain((Key::Alt(' '), || {
                        context.gesture(Gesture::Primary, Modifiers::alt())
                    }))
                    .chain((Key::Char('v'), || {
                        context.gesture(Gesture::Primary, Modifiers::alt())
                    }))
                    .chain((Key::Char('x'), || {
                        context.gesture(Gesture::Secondary, Modifiers::default())
                    }))
                    .chain((Key::Char(']'), || context.step_year(1)))
                    .chain((Key::Char('['), || context.step_year(-1)))
                    .chain(
                        NavigateBehavior::new(&mut CursorBehaviour(context))
                            .down_on(Key::Char('j'))
                            .up_on(Key::Char('k'))
                            .left_on(Key::Char('h'))
                            .right_on(Key::Char('l'))
                            .down_on(Key::Down)
                            .up_on(Key::Up)
                            .left_on(Key::Left)
                            .right_on(Key::Right),
                    )
                    .finish();
            }
            Mode::Command => {
                input
                    .chain(
                        EditBehavior::new(&mut self.context.command_line)
                            .delete_forwards_on(Key::Delete)
                            .delete_backwards_on(Key::Backspace)
                            .left_on(Key::Left)
                            .right_on(Key::Right),
                    )
                    .chain(
                        ScrollBehavior::new(&mut self.context.command_line)
                            .backwards_on(Key::Up)
                            .forwards_on(Key::Down),
                    )
                    .chain(CommandParser::new(&mut self.context))
                    .finish();
            }
        }
    }

    pub fn run(
        &mut self,
        dispatcher: Dispatcher,
        mut term: Terminal,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.context.set_event_sink(dispatcher.event_sink().clone());

        while !self.context.quit {
            match dispatcher.next() {
                Ok(Event::Update) => {}
                Ok(Event::ImportLoaded(path, contents)) => {
                    log::debug!("Finished reading '{}'", path.display());
                    self.context.finish_import(contents);
                }
                Ok(Event::Input(input)) => self.handle_input(input),
                Err(e) => {
                    log::error!("Event channel closed: {}", e);
                    break;
                }
            }

            let root = term.create_root_window();
            self.as_widget().draw(root, RenderingHints::new());
            term.present();
        }

        Ok(())
    }
}

struct CursorBehaviour<'a>(&'a mut Context);

impl CursorBehaviour<'_> {
    fn step(&mut self, days: i64) -> OperationResult {
        if self.0.move_cursor(days) {
            Ok(())
        } else {
            Err(())
        }
    }
}

impl Navigatable for CursorBehaviour<'_> {
    fn move_down(&mut self) -> OperationResult {
        self.step(7)
    }

    fn move_left(&mut self) -> OperationResult {
        self.step(-1)
    }

    fn move_right(&mut self) -> OperationResult {
        self.step(1)
    }

    fn move_up(&mut self) -> OperationResult {
        self.step(-7)
    }
}
