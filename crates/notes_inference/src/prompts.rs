//! Prompt templates and the fixed user-facing messages, in the service's operating locale (Turkish).

pub const SHORT_CONTENT_SUMMARY: &str = "İçerik çok kısa, özetleme için yeterli değil.";

const TIMEOUT_NOTICE: &str = "AI özetleme zaman aşımına uğradı.";
const ERROR_NOTICE: &str = "AI özetleme hatası";
const PREVIEW_LABEL: &str = "İçeriğin ilk 200 karakteri";

pub fn summary_prompt(content: &str) -> String {
    format!(
        "Aşağıdaki not içeriğini Türkçe olarak özetleyin ve anahtar noktaları çıkarın.\n\
         \n\
         İçerik:\n\
         {content}\n\
         \n\
         Lütfen şu formatta yanıt verin:\n\
         1. Özet: (2-3 cümlelik kısa özet)\n\
         2. Anahtar Noktalar: (Her biri bir satırda, maksimum 5 adet)\n\
         \n\
         Özet kısa ve öz olsun, anahtar noktalar ise madde madde listelensin.\n"
    )
}

pub fn todo_prompt(content: &str) -> String {
    format!(
        "Aşağıdaki metni analiz et ve yapılacak işleri (todo'ları) çıkar.\n\
         \n\
         Metin:\n\
         {content}\n\
         \n\
         Lütfen şu formatta yanıt ver:\n\
         1. Eğer yapılacak iş varsa: \"TODOS:\" yaz ve her birini ayrı satırda listele\n\
         2. Eğer yapılacak iş yoksa: \"NO_TODOS\" yaz\n\
         \n\
         Örnek:\n\
         \"Yarın sunum dosyasını tamamla ve Ali'ye gönder\"\n\
         TODOS:\n\
         - Sunum dosyasını tamamla\n\
         - Ali'ye gönder\n\
         \n\
         Sadece yapılacak işleri çıkar, geçmiş olayları değil.\n"
    )
}

pub fn timeout_summary(preview: &str) -> String {
    format!("{} {}: {}", TIMEOUT_NOTICE, PREVIEW_LABEL, preview)
}

pub fn error_summary(error: &str, preview: &str) -> String {
    format!("{}: {}. {}: {}", ERROR_NOTICE, error, PREVIEW_LABEL, preview)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_embed_content() {
        let content = "Yarın markete git";
        assert!(summary_prompt(content).contains("İçerik:\nYarın markete git\n"));
        assert!(todo_prompt(content).contains("Metin:\nYarın markete git\n"));
        assert!(todo_prompt(content).contains("NO_TODOS"));
    }

    #[test]
    fn test_fallback_messages() {
        assert_eq!(
            timeout_summary("abc"),
            "AI özetleme zaman aşımına uğradı. İçeriğin ilk 200 karakteri: abc"
        );
        assert_eq!(
            error_summary("quota exceeded", "abc"),
            "AI özetleme hatası: quota exceeded. İçeriğin ilk 200 karakteri: abc"
        );
    }
}
