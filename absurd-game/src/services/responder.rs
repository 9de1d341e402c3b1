//! Offline canned replies, the last stage of the reply pipeline.

use rand::seq::SliceRandom;
use rand::thread_rng;

/// Keyword category a prompt can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    HowAreYou,
    Name,
    Abilities,
    Help,
    Why,
    Thanks,
    Greeting,
}

/// Checked in this order; more specific categories come first so
/// "привет, как дела?" is answered as a how-are-you question.
const CATEGORY_ORDER: [Category; 7] = [
    Category::HowAreYou,
    Category::Name,
    Category::Abilities,
    Category::Help,
    Category::Why,
    Category::Thanks,
    Category::Greeting,
];

impl Category {
    /// Single words match whole tokens; multi-word keywords match as phrases.
    fn keywords(self) -> &'static [&'static str] {
        match self {
            Category::HowAreYou => &[
                "как дела",
                "как поживаешь",
                "как жизнь",
                "how are you",
                "how's it going",
            ],
            Category::Name => &[
                "как тебя зовут",
                "твое имя",
                "твоё имя",
                "кто ты",
                "your name",
                "who are you",
            ],
            Category::Abilities => &[
                "что ты умеешь",
                "что умеешь",
                "что ты можешь",
                "what can you do",
            ],
            Category::Help => &["помоги", "помощь", "помогите", "help"],
            Category::Why => &["почему", "зачем", "why"],
            Category::Thanks => &["спасибо", "благодарю", "спс", "thanks", "thank", "thx"],
            Category::Greeting => &[
                "привет",
                "здравствуй",
                "здравствуйте",
                "хай",
                "салют",
                "добрый день",
                "hello",
                "hi",
                "hey",
            ],
        }
    }

    /// Keywords that only count when they end the prompt: "как ты?" asks how
    /// the bot is, "как ты думаешь…" does not.
    fn trailing_keywords(self) -> &'static [&'static str] {
        match self {
            Category::HowAreYou => &["как ты", "а ты", "how about you"],
            _ => &[],
        }
    }

    pub fn replies(self) -> &'static [&'static str] {
        match self {
            Category::HowAreYou => &[
                "Отлично! Только что поспорил с тостером о смысле жизни и выиграл 🍞",
                "Как квантовый кот: одновременно прекрасно и ужасно 🐱",
                "Лучше всех! Мои байты сегодня особенно хрустящие 🤖",
            ],
            Category::Name => &[
                "Я Абсурд-бот! Фамилию съела цифровая мышь 🐭",
                "Меня зовут Абсурд-бот, но друзья называют меня «Ошибка 418» ☕",
                "Я бот абсурда, повелитель нелепиц и хранитель носков 🧦",
            ],
            Category::Abilities => &[
                "Умею отвечать на вопросы, которые ты не задавал 🤪",
                "Могу досчитать до бесконечности. Дважды 🔢",
                "Генерирую абсурд со скоростью 100 нелепиц в секунду 🚀",
            ],
            Category::Help => &[
                "Помощь уже в пути! Она едет на улитке 🐌",
                "Выбери жанр и жми «Дальше». Если не поможет, погладь монитор 🖥️",
                "Я помогу! Но сначала найду свои очки… их у меня нет 👓",
            ],
            Category::Why => &[
                "Потому что пингвины так решили на тайном собрании 🐧",
                "Зачем? Затем, что луна сделана из сыра 🧀",
                "Это знают только голуби, а они молчат 🕊️",
            ],
            Category::Thanks => &[
                "Пожалуйста! Спасибо принимаю только в виде печенек 🍪",
                "Всегда рад! Заходи ещё, у меня полно абсурда 🎪",
                "Не за что! Я просто делаю свою нелепую работу 😎",
            ],
            Category::Greeting => &[
                "Привет-привет! Я Абсурд-бот 🤖 Задай мне что-нибудь странное!",
                "Здравствуй, землянин! Мой абсурдометр уже греется 🔥",
                "Хай! Ты как раз вовремя для чаепития с динозаврами 🦖",
            ],
        }
    }
}

/// Replies used when no category matches.
pub const GENERIC_REPLIES: &[&str] = &[
    "Мой абсурдометр перегрелся! 🔥",
    "Сервер съели цифровые мыши 🐭",
    "Попробуй еще раз, я был занят сном 😴",
    "Ошибка 404: абсурд не найден 🤪",
    "Интересно! Но я отвлёкся на летающую картошку 🥔",
];

/// Matches the prompt against keyword categories and picks a canned reply.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalResponder;

impl LocalResponder {
    pub fn new() -> Self {
        LocalResponder
    }

    /// Find the first category whose keywords appear in the prompt.
    pub fn categorize(&self, prompt: &str) -> Option<Category> {
        let tokens = tokenize(prompt);
        let normalized = format!(" {} ", tokens.join(" "));

        CATEGORY_ORDER.into_iter().find(|category| {
            let anywhere = category.keywords().iter().any(|keyword| {
                if keyword.contains(' ') {
                    normalized.contains(&format!(" {keyword} "))
                } else {
                    tokens.iter().any(|t| t == keyword)
                }
            });
            anywhere
                || category
                    .trailing_keywords()
                    .iter()
                    .any(|keyword| normalized.ends_with(&format!(" {keyword} ")))
        })
    }

    /// Always returns a non-empty reply.
    pub fn respond(&self, prompt: &str) -> &'static str {
        let pool = match self.categorize(prompt) {
            Some(category) => category.replies(),
            None => GENERIC_REPLIES,
        };
        pool.choose(&mut thread_rng()).copied().unwrap_or(GENERIC_REPLIES[0])
    }
}

/// Lowercase and split on anything that is not a letter, digit or apostrophe.
fn tokenize(prompt: &str) -> Vec<String> {
    prompt
        .to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
